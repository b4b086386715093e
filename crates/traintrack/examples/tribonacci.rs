//! Analyze the Tribonacci automorphism a->ab, b->ac, c->a.
//!
//! Prints the spectral data, the Nielsen-path inventory and the iwip
//! verdict. Run with RUST_LOG=debug for a trace of the analyzer.

use traintrack::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut f = TrainTrackMap::from_edge_map("a->ab,b->ac,c->a").expect("valid edge map");
    println!("{}", f);

    let perron = Perron::compute(&f.transition_matrix()).expect("irreducible matrix");
    println!("expansion factor: {:.6}", perron.eigenvalue_approx());
    println!(
        "eigenvector:      {:?}",
        perron.eigenvector_approx()
    );

    let inps = f.indivisible_nielsen_paths().expect("expanding map");
    println!("INPs:             {}", inps.len());
    let pnps = f.periodic_nielsen_paths().expect("expanding map");
    for pnp in &pnps {
        println!(
            "pNP:              ({}, {}) period {}",
            pnp.u.display(f.alphabet()),
            pnp.v.display(f.alphabet()),
            pnp.period
        );
    }
    let loops = f.periodic_nielsen_loops(&pnps).expect("expanding map");
    println!("Nielsen loops:    {}", loops.len());
    println!("index list:       {:?}", f.index_list().expect("expanding map"));

    let verdict = f.is_iwip().expect("analyzable map");
    println!("iwip:             {}", verdict);
}
