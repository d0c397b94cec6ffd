use crate::crawler::CrawlGraph;
use crate::flows::{Flow, FlowLimits};
use crate::url::{normalize_seed, CanonicalUrl, Scope};

/// Enumerates the flows through `graph` that start at `seed`
///
/// # Algorithm
///
/// Depth-first with an explicit stack of `(page, path)` entries:
///
/// 1. A path is emitted once it has `max_depth` hops or its last page has no
///    outbound links
/// 2. Otherwise every neighbor not already on the path is pushed, in
///    lexicographic order; if there is none the path is emitted as is
/// 3. Enumeration stops after `max_flows` flows, or once the number of
///    expanded pages exceeds `max_flows * 10`
///
/// Flows come out in stack-pop order. A seed that does not canonicalize
/// yields no flows.
///
/// # Example
///
/// ```
/// use flowmap::crawler::CrawlGraph;
/// use flowmap::url::Scope;
/// use flowmap::{enumerate_flows, FlowLimits};
/// use url::Url;
///
/// let scope = Scope::from_seed("https://example.com/");
/// let base = Url::parse("https://example.com/").unwrap();
/// let home = scope.canonicalize(&base, "/").unwrap();
/// let about = scope.canonicalize(&base, "/about").unwrap();
///
/// let mut graph = CrawlGraph::new();
/// graph.add_edge(home, about);
///
/// let flows = enumerate_flows("https://example.com/", &graph, FlowLimits::default());
/// assert_eq!(flows.len(), 1);
/// assert_eq!(flows[0].to_string(), "https://example.com/ → https://example.com/about");
/// ```
pub fn enumerate_flows(seed: &str, graph: &CrawlGraph, limits: FlowLimits) -> Vec<Flow> {
    let seed = normalize_seed(seed);
    let Some(start) = Scope::from_seed(&seed).canonicalize_seed(&seed) else {
        tracing::warn!("Seed {} does not canonicalize, no flows", seed);
        return Vec::new();
    };

    let mut flows = Vec::new();
    let mut stack: Vec<(CanonicalUrl, Vec<CanonicalUrl>)> = vec![(start.clone(), vec![start])];
    let mut expansions = 0usize;

    while flows.len() < limits.max_flows {
        let Some((page, path)) = stack.pop() else {
            break;
        };

        if path.len() - 1 >= limits.max_depth || !graph.has_edges(&page) {
            flows.push(Flow::new(path));
            continue;
        }

        let next: Vec<&CanonicalUrl> = graph
            .sorted_neighbors(&page)
            .into_iter()
            .filter(|neighbor| !path.contains(neighbor))
            .collect();

        if next.is_empty() {
            // every neighbor is already on the path
            flows.push(Flow::new(path));
            continue;
        }

        for neighbor in next {
            let mut extended = path.clone();
            extended.push(neighbor.clone());
            stack.push((neighbor.clone(), extended));
        }

        expansions += 1;
        if expansions > limits.expansion_cap() {
            tracing::warn!(
                "Flow enumeration stopped after {} expansions ({} flows)",
                expansions,
                flows.len()
            );
            break;
        }
    }

    tracing::debug!("Enumerated {} flows", flows.len());
    flows
}
