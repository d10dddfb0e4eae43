use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use graph_stepper_core::{
    edge_list, Engine, EngineConfig, Graph, ListGraph, MatrixGraph, Observer, ObserverSink, Pacing,
    PauseController, Recorder, StepEvent, StepSink, VertexId, Weight, INFINITE_DISTANCE,
};

/// Environment variable naming a JSON [`EngineConfig`] file for the demo.
const CONFIG_ENV: &str = "GRAPH_STEPPER_CONFIG";

/// Largest graph also benchmarked as an adjacency matrix (n² weights).
const MATRIX_LIMIT: usize = 2048;

/// Generators need room for the barbell bridge plus two cliques.
const MIN_NODES: usize = 16;

const MAX_WEIGHT: u64 = 100;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let node_count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: graph-stepper-bench [mode] [node_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  tree        Ternary tree (deep paths, single component)");
        println!("  random      Erdos-Renyi uniform random edges");
        println!("  smallworld  Watts-Strogatz ring lattice + shortcuts");
        println!("  barbell     Two dense cliques connected by a thin bridge");
        println!("  demo        Paced Dijkstra on a background thread with pause/resume");
        println!();
        println!("Default node_count: 2000. Matrix runs only up to {MATRIX_LIMIT} nodes.");
        println!("Set {CONFIG_ENV} to a JSON config file to change demo pacing.");
        return Ok(());
    }

    if mode == "demo" {
        return run_demo();
    }

    let generators: Vec<(&str, fn(usize) -> Result<ListGraph>)> = match mode {
        "tree" => vec![("Ternary tree", gen_tree)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "barbell" => vec![("Barbell (clique-bridge-clique)", gen_barbell)],
        "all" => vec![
            ("Ternary tree", gen_tree as fn(usize) -> Result<ListGraph>),
            ("Erdos-Renyi random", gen_random),
            ("Small-world (Watts-Strogatz)", gen_small_world),
            ("Barbell (clique-bridge-clique)", gen_barbell),
        ],
        _ => bail!("unknown mode: {mode}. Use --help for options."),
    };

    println!("graph-stepper-bench");
    println!("===================");
    println!();

    let node_count = node_count.max(MIN_NODES);
    let engine = Engine::headless();
    for (name, generator) in generators {
        run_benchmark(&engine, name, generator, node_count)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Benchmark
// ---------------------------------------------------------------------------

/// Headless sink that only counts events.
struct CountingSink<G> {
    graph: G,
    events: usize,
}

impl<G: Graph> StepSink for CountingSink<G> {
    type Graph = G;

    fn graph(&self) -> &G {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    fn emit(&mut self, _event: StepEvent, _pacing: Duration) {
        self.events += 1;
    }
}

struct Row {
    algorithm: &'static str,
    value: Weight,
    events: usize,
    elapsed: Duration,
}

fn run_benchmark(
    engine: &Engine,
    name: &str,
    generator: fn(usize) -> Result<ListGraph>,
    node_count: usize,
) -> Result<()> {
    println!("--- {} ---", name);
    println!("Target: {} nodes", node_count);

    let t = Instant::now();
    let list = generator(node_count)?;
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s, {} nodes, {} edges, ~{:.1}MB as lists",
        gen_time.as_secs_f64(),
        list.vertex_count(),
        list.edge_count(),
        list.memory_usage() as f64 / 1_048_576.0
    );

    let matrix = if list.vertex_count() <= MATRIX_LIMIT {
        let mut matrix = MatrixGraph::new(list.vertex_count())?;
        for edge in edge_list(&list, false) {
            matrix.set_edge(edge.source, edge.dest, edge.weight)?;
        }
        Some(matrix)
    } else {
        tracing::info!(nodes = list.vertex_count(), "skipping matrix representation");
        None
    };

    println!();
    println!(
        "{:>14} {:>8} {:>14} {:>10} {:>10}",
        "algorithm", "repr", "result", "events", "time"
    );
    println!("{:->14} {:->8} {:->14} {:->10} {:->10}", "", "", "", "", "");

    let list_rows = bench_representation(engine, list)?;
    print_rows("list", &list_rows);
    check_agreement(&list_rows)?;

    if let Some(matrix) = matrix {
        let matrix_rows = bench_representation(engine, matrix)?;
        print_rows("matrix", &matrix_rows);
        check_agreement(&matrix_rows)?;
        for (a, b) in list_rows.iter().zip(&matrix_rows) {
            if a.value != b.value {
                bail!(
                    "{}: list result {} differs from matrix result {}",
                    a.algorithm,
                    a.value,
                    b.value
                );
            }
        }
    }

    println!();
    Ok(())
}

fn bench_representation<G: Graph>(engine: &Engine, graph: G) -> Result<Vec<Row>> {
    let far = graph.vertex_count() - 1;
    let mut sink = CountingSink { graph, events: 0 };

    let mut rows = Vec::with_capacity(7);
    rows.push(timed(&mut sink, "DFS", |s| {
        Ok(engine.dfs(s, 0)?.reached() as Weight)
    })?);
    rows.push(timed(&mut sink, "BFS", |s| {
        Ok(engine.bfs(s, 0)?.reached() as Weight)
    })?);
    rows.push(timed(&mut sink, "Kruskal", |s| {
        Ok(engine.kruskal(s)?.total_weight)
    })?);
    rows.push(timed(&mut sink, "Prim", |s| Ok(engine.prim(s, 0)?.total_weight))?);
    rows.push(timed(&mut sink, "Boruvka", |s| {
        Ok(engine.boruvka(s)?.total_weight)
    })?);
    rows.push(timed(&mut sink, "Dijkstra", |s| {
        engine.dijkstra_distance(s, 0, far)
    })?);
    rows.push(timed(&mut sink, "Bellman-Ford", |s| {
        engine.bellman_ford_distance(s, 0, far)
    })?);
    Ok(rows)
}

fn timed<G: Graph>(
    sink: &mut CountingSink<G>,
    algorithm: &'static str,
    run: impl FnOnce(&mut CountingSink<G>) -> graph_stepper_core::Result<Weight>,
) -> Result<Row> {
    sink.events = 0;
    let t = Instant::now();
    let value = run(sink).with_context(|| format!("{algorithm} failed"))?;
    Ok(Row {
        algorithm,
        value,
        events: sink.events,
        elapsed: t.elapsed(),
    })
}

fn print_rows(repr: &str, rows: &[Row]) {
    for row in rows {
        let result = if row.value == INFINITE_DISTANCE {
            "unreachable".to_string()
        } else {
            row.value.to_string()
        };
        println!(
            "{:>14} {:>8} {:>14} {:>10} {:>8.1}ms",
            row.algorithm,
            repr,
            result,
            row.events,
            row.elapsed.as_secs_f64() * 1000.0
        );
    }
}

/// Traversals reach the same set, all MSTs weigh the same, both
/// shortest-path algorithms agree.
fn check_agreement(rows: &[Row]) -> Result<()> {
    let value = |name: &str| {
        rows.iter()
            .find(|r| r.algorithm == name)
            .map(|r| r.value)
            .ok_or_else(|| anyhow!("missing {name} row"))
    };
    let groups: [&[&str]; 3] = [
        &["DFS", "BFS"],
        &["Kruskal", "Prim", "Boruvka"],
        &["Dijkstra", "Bellman-Ford"],
    ];
    for group in groups {
        let first = value(group[0])?;
        for name in &group[1..] {
            let other = value(name)?;
            if other != first {
                bail!("{} returned {} but {} returned {}", group[0], first, name, other);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

/// Observer that narrates to the log and sleeps for the requested pacing.
struct ConsoleObserver {
    graph: ListGraph,
    highlighted: BTreeSet<(VertexId, VertexId)>,
}

impl Observer for ConsoleObserver {
    type Graph = ListGraph;

    fn graph(&self) -> &ListGraph {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut ListGraph {
        &mut self.graph
    }

    fn reset_visuals(&mut self) {
        self.highlighted.clear();
    }

    fn mark_edge(&mut self, source: VertexId, dest: VertexId, visited: bool) {
        if visited {
            self.highlighted.insert((source, dest));
        } else {
            self.highlighted.remove(&(source, dest));
        }
    }

    fn pause_and_redraw(&mut self, message: &str, pacing: Duration) {
        tracing::info!(highlighted = self.highlighted.len(), "{message}");
        if !pacing.is_zero() {
            thread::sleep(pacing);
        }
    }
}

fn load_config() -> Result<EngineConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = Path::new(&path);
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(EngineConfig {
            pacing: Pacing {
                scale: 0.1,
                ..Pacing::default()
            },
        }),
    }
}

fn demo_graph() -> Result<ListGraph> {
    let mut graph = ListGraph::new(6)?;
    for (from, to, weight) in [
        (0, 1, 7),
        (0, 2, 9),
        (0, 5, 14),
        (1, 2, 10),
        (1, 3, 15),
        (2, 3, 11),
        (2, 5, 2),
        (3, 4, 6),
        (4, 5, 9),
    ] {
        graph.set_undirected_edge(from, to, weight)?;
    }
    Ok(graph)
}

fn run_demo() -> Result<()> {
    let pause = PauseController::new();
    let engine = Engine::with_pause(load_config()?, pause.clone());
    tracing::info!(scale = engine.config().pacing.scale, "starting demo");

    let worker = {
        let engine = engine.clone();
        let graph = demo_graph()?;
        thread::spawn(move || {
            let mut sink = ObserverSink::new(ConsoleObserver {
                graph,
                highlighted: BTreeSet::new(),
            });
            let result = engine.dijkstra(&mut sink, 0, 4)?;
            Ok::<_, graph_stepper_core::Error>((result, sink.into_inner()))
        })
    };

    thread::sleep(Duration::from_millis(500));
    pause.pause();
    tracing::info!("paused from main thread");
    thread::sleep(Duration::from_secs(1));
    pause.resume();
    tracing::info!("resumed");

    let (path, observer) = worker
        .join()
        .map_err(|_| anyhow!("demo thread panicked"))??;
    tracing::info!(
        highlighted = observer.highlighted.len(),
        "shortest path run finished"
    );
    println!("{}", serde_json::to_string_pretty(&path)?);

    // Same graph, unpaced, for the other two families.
    let headless = Engine::headless();
    let mut rec = Recorder::new(observer.graph);
    let traversal = headless.dfs(&mut rec, 0)?;
    let forest = headless.kruskal(&mut rec)?;
    println!("{}", serde_json::to_string_pretty(&traversal)?);
    println!("{}", serde_json::to_string_pretty(&forest)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Generators: all O(n) or O(n + edges), single-threaded, deterministic
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    fn weight(&mut self) -> Weight {
        1 + self.next(MAX_WEIGHT) as Weight
    }
}

/// Ternary tree: every node hangs below `(v - 1) / 3`.
///
/// Deep paths with exponential width; MST is the tree itself.
fn gen_tree(node_count: usize) -> Result<ListGraph> {
    let mut graph = ListGraph::new(node_count)?;
    let mut rng = FastRng::new(42);

    let mut frontier: VecDeque<VertexId> = VecDeque::from([0]);
    let mut next_id = 1;
    while next_id < node_count {
        let Some(parent) = frontier.pop_front() else {
            break;
        };
        for _ in 0..3 {
            if next_id >= node_count {
                break;
            }
            graph.set_undirected_edge(parent, next_id, rng.weight())?;
            frontier.push_back(next_id);
            next_id += 1;
        }
    }
    Ok(graph)
}

/// Erdos-Renyi: uniform random edges, ~5 per node.
///
/// Usually disconnected at this density's low end, which exercises the
/// forest paths of the MST algorithms.
fn gen_random(node_count: usize) -> Result<ListGraph> {
    let mut graph = ListGraph::new(node_count)?;
    let mut rng = FastRng::new(54321);
    let n = node_count as u64;

    for _ in 0..node_count * 5 {
        let from = rng.next(n) as usize;
        let to = rng.next(n) as usize;
        if from != to {
            graph.set_undirected_edge(from, to, rng.weight())?;
        }
    }
    Ok(graph)
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Each node connects to its K nearest ring neighbors; each edge is rewired
/// with probability p.
fn gen_small_world(node_count: usize) -> Result<ListGraph> {
    let k = 4usize;
    let p = 0.05f64;
    let mut graph = ListGraph::new(node_count)?;
    let mut rng = FastRng::new(67890);

    for i in 0..node_count {
        for j in 1..=k {
            let neighbor = (i + j) % node_count;
            let target = if rng.next_f64() < p {
                let rewired = rng.next(node_count as u64) as usize;
                if rewired != i {
                    rewired
                } else {
                    neighbor
                }
            } else {
                neighbor
            };
            graph.set_undirected_edge(i, target, rng.weight())?;
        }
    }
    Ok(graph)
}

/// Barbell: two dense cliques joined by a chain of bridge nodes.
///
/// Every path between the halves goes through the bridge.
fn gen_barbell(node_count: usize) -> Result<ListGraph> {
    let bridge_len = 10usize;
    let clique_size = (node_count - bridge_len) / 2;
    let mut graph = ListGraph::new(node_count)?;
    let mut rng = FastRng::new(99999);

    let b_start = clique_size + bridge_len;
    for base in [0, b_start] {
        for i in 0..clique_size {
            for _ in 0..10.min(clique_size - 1) {
                let target = rng.next(clique_size as u64) as usize;
                if target != i {
                    graph.set_undirected_edge(base + i, base + target, rng.weight())?;
                }
            }
        }
    }

    // chain from the last node of A through the bridge into the first node of B
    for id in clique_size..=b_start {
        graph.set_undirected_edge(id - 1, id, rng.weight())?;
    }
    Ok(graph)
}
