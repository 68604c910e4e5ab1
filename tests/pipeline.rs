use netgrowth::prelude::*;
use netgrowth::prelude::synth::read_edge_list;
use netgrowth::{run_all, run_figure, Figure};
use std::path::{Path, PathBuf};

fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "netgrowth-pipeline-{}-{}",
        label,
        std::process::id()
    ));
    std::fs::remove_dir_all(&dir).ok();
    dir
}

/// Same blocks as the published run, on graphs small enough for a test
fn small_config(dir: &Path) -> Config {
    let mut config = Config::default()
        .with_data_dir(dir.join("data"))
        .with_results_dir(dir.join("results"))
        .with_seed(42);
    config.fig1.step = 0.25;
    config.fig1.graph = config.fig1.graph.with_n_max(300);
    config.fig2.graph = config.fig2.graph.with_n_max(300);
    config.fig2.max_deg = 20;
    config.fig3.grid = vec![(1.0, 0.5), (0.5, 1.0)];
    config.fig3.n_max = 200;
    config.fig4.graphs = config
        .fig4
        .graphs
        .into_iter()
        .map(|g| g.with_n_max(300).with_n_alt(20))
        .collect();
    config.fig5.max_deg = 20;
    config
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn likelihood_surface_and_em_trace() {
    let dir = temp_dir("fig1");
    let config = small_config(&dir);
    let files = run_figure(Figure::LikelihoodSurface, &config).unwrap();
    assert_eq!(files.len(), 2);

    let surface = read_lines(&files[0]);
    assert_eq!(surface[0], "alpha,p,ll");
    // arange(0, 2, 0.25) x arange(0, 1, 0.25)
    assert_eq!(surface.len(), 1 + 8 * 4);
    assert!(surface[1].starts_with("0,0,"));

    let em = read_lines(&files[1]);
    assert_eq!(em[0], "round,ll,p_uniform,p_log_degree,log_degree_alpha");
    assert!(em[1].starts_with("0,"));
    assert!(em[1].ends_with(",0.25"));
    assert!(em.len() > 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn attachment_function_rows() {
    let dir = temp_dir("fig2");
    let config = small_config(&dir);
    let files = run_figure(Figure::AttachmentFunction, &config).unwrap();

    let lines = read_lines(&files[0]);
    assert_eq!(lines[0], "deg,coef,se");
    assert_eq!(lines.len(), 1 + 21 + 1);
    assert!(lines[1].starts_with("0,"));
    assert!(lines[21].starts_with("20,"));
    assert!(lines[22].starts_with("alpha,"));

    // The synthesized graph and its choices are left in the data directory
    let paths = DataPaths::new(&config.data_dir);
    assert!(paths.graph("test_pa").exists());
    let data = read_choices(paths.choices("test_pa")).unwrap();
    assert!(!data.is_empty());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn degree_distributions_cover_grid() {
    let dir = temp_dir("fig3");
    let config = small_config(&dir);
    let files = run_figure(Figure::DegreeDistributions, &config).unwrap();

    let lines = read_lines(&files[0]);
    assert_eq!(lines[0], "r,p,deg,count");
    let mut per_graph = [0usize; 2];
    for line in &lines[1..] {
        let fields: Vec<&str> = line.split(',').collect();
        match (fields[0], fields[1]) {
            ("1.00", "0.50") => per_graph[0] += fields[3].parse::<usize>().unwrap(),
            ("0.50", "1.00") => per_graph[1] += fields[3].parse::<usize>().unwrap(),
            other => panic!("unexpected grid point {:?}", other),
        }
    }
    // Every node is counted once
    assert_eq!(per_graph, [200, 200]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn misspecified_models_and_per_model_estimates() {
    let dir = temp_dir("fig45");
    let config = small_config(&dir);
    let files = run_all(&[Figure::PerModelEstimates, Figure::Misspecified], &config).unwrap();
    assert_eq!(files.len(), 2);

    let fig4 = read_lines(&files[0]);
    assert_eq!(fig4[0], "data,model,p,ll");
    // Two graphs, 21 weights, two models
    assert_eq!(fig4.len(), 1 + 2 * 21 * 2);
    assert!(fig4[1].starts_with("\"r=1.00, p=0.50\",p,0,"));
    assert!(fig4[22].starts_with("\"r=1.00, p=0.50\",r,0,"));
    assert!(fig4[43].starts_with("\"r=0.50, p=1.00\",p,0,"));
    for line in &fig4[1..] {
        let ll: f64 = line.rsplit(',').next().unwrap().parse().unwrap();
        assert!(ll.is_finite() && ll < 0.0);
    }

    let fig5 = read_lines(&files[1]);
    assert_eq!(fig5[0], "data,deg,coef,se");
    assert_eq!(fig5.len(), 1 + 2 * 21);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn same_seed_same_output() {
    let dir = temp_dir("seed");
    let config = small_config(&dir);
    let first = run_figure(Figure::Misspecified, &config).unwrap();
    let a = read_lines(&first[0]);
    let second = run_figure(Figure::Misspecified, &config).unwrap();
    let b = read_lines(&second[0]);
    assert_eq!(a, b);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn figure_one_reads_configured_choices() {
    let dir = temp_dir("choices");
    let mut config = small_config(&dir);
    run_figure(Figure::AttachmentFunction, &config).unwrap();
    config.fig1.choices = Some(DataPaths::new(&config.data_dir).choices("test_pa"));

    run_figure(Figure::LikelihoodSurface, &config).unwrap();
    // No fig1 graph is synthesized when a choice file is given
    let paths = DataPaths::new(&config.data_dir);
    assert!(!paths.graph(&config.fig1.graph.name).exists());

    std::fs::remove_dir_all(&dir).ok();
}

fn max_node(path: &Path) -> usize {
    read_edge_list(path)
        .unwrap()
        .iter()
        .map(|e| e.from.max(e.to))
        .max()
        .unwrap()
}

#[test]
fn per_model_estimates_reuse_matching_choices() {
    let dir = temp_dir("reuse");
    let config = small_config(&dir);
    let paths = DataPaths::new(&config.data_dir);
    run_figure(Figure::Misspecified, &config).unwrap();
    let name = &config.fig4.graphs[0].name;
    let before = std::fs::read(paths.choices(name)).unwrap();
    assert!(paths.provenance(name).exists());

    run_figure(Figure::PerModelEstimates, &config).unwrap();
    assert_eq!(std::fs::read(paths.choices(name)).unwrap(), before);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn per_model_estimates_resynthesize_stale_choices() {
    let dir = temp_dir("stale");
    let mut config = small_config(&dir);
    let paths = DataPaths::new(&config.data_dir);
    run_figure(Figure::Misspecified, &config).unwrap();
    let name = config.fig4.graphs[0].name.clone();
    assert!(max_node(&paths.graph(&name)) >= 200);

    config.fig4.graphs = config
        .fig4
        .graphs
        .into_iter()
        .map(|g| g.with_n_max(200))
        .collect();
    run_figure(Figure::PerModelEstimates, &config).unwrap();
    assert!(max_node(&paths.graph(&name)) < 200);

    // A different seed also invalidates the stored choices
    let before = std::fs::read(paths.choices(&name)).unwrap();
    let config = config.with_seed(43);
    run_figure(Figure::PerModelEstimates, &config).unwrap();
    assert_ne!(std::fs::read(paths.choices(&name)).unwrap(), before);

    std::fs::remove_dir_all(&dir).ok();
}
