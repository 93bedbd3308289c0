//! Benchmarks for chip tree evaluation.

use chipcost_core::{InterconnectModel, WaferProcess, WaferProcessParams};
use chipcost_model::{Catalogs, ChipSpec, Evaluator, ModelConfig};
use chipcost_process::{AssemblyParams, AssemblyProcess, Layer, LayerParams, TestParams, TestProcess};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn catalogs() -> Catalogs {
    let mut catalogs = Catalogs::new();
    catalogs
        .wafer_processes
        .insert(WaferProcess::new("wp", WaferProcessParams::default()).unwrap())
        .unwrap();
    catalogs
        .layers
        .insert(
            Layer::new(
                "metal",
                LayerParams {
                    cost_per_mm2: 0.1,
                    defect_density: 0.001,
                    litho_percent: 0.2,
                    mask_cost: 1e5,
                    ..Default::default()
                },
            )
            .unwrap(),
        )
        .unwrap();
    catalogs
        .assembly_processes
        .insert(
            AssemblyProcess::new(
                "ap",
                AssemblyParams {
                    materials_cost_per_mm2: 0.01,
                    die_separation: 0.1,
                    edge_exclusion: 0.5,
                    ..Default::default()
                },
            )
            .unwrap(),
        )
        .unwrap();
    catalogs
        .test_processes
        .insert(TestProcess::new("tp", TestParams::default()).unwrap())
        .unwrap();
    catalogs.freeze();
    catalogs
}

fn tree(dies: usize) -> ChipSpec {
    let mut root = ChipSpec::new("interposer", 0.0)
        .with_processes("wp", "ap", "tp")
        .with_stackup("4:metal");
    for i in 0..dies {
        root = root.with_child(
            ChipSpec::new(format!("die{i}"), 40.0)
                .with_processes("wp", "ap", "tp")
                .with_stackup("10:metal")
                .with_power(5.0, 0.8),
        );
    }
    root
}

fn bench_evaluate(c: &mut Criterion) {
    let catalogs = catalogs();
    let interconnect = InterconnectModel::default();
    let evaluator = Evaluator::new(&catalogs, &interconnect).with_config(ModelConfig::default().with_seed(1));
    let spec = tree(8);
    c.bench_function("evaluate_interposer_8_dies", |b| {
        b.iter(|| evaluator.evaluate(black_box(&spec)).unwrap());
    });
}

fn bench_evaluate_all(c: &mut Criterion) {
    let catalogs = catalogs();
    let interconnect = InterconnectModel::default();
    let evaluator = Evaluator::new(&catalogs, &interconnect).with_config(ModelConfig::default().with_seed(1));
    let specs: Vec<ChipSpec> = (1..=32).map(tree).collect();
    c.bench_function("evaluate_all_32_trees", |b| {
        b.iter(|| evaluator.evaluate_all(black_box(&specs)));
    });
}

criterion_group!(benches, bench_evaluate, bench_evaluate_all);
criterion_main!(benches);
