//! Property tests: random write/clear sequences never break the cascade.
//!
//! A tiny reference model tracks which stages should be set; after every
//! operation the engine must agree with it.

use nl2graph_core::traits::storage::IResultStore;
use nl2graph_core::{
    EvaluationResult, ExecutionResult, GenerationResult, Method, RunConfig, Stage,
};
use nl2graph_storage::ResultStorageEngine;
use proptest::prelude::*;
use serde_json::json;

const IDS: [&str; 3] = ["q1", "q2", "q3"];

#[derive(Debug, Clone)]
enum Op {
    Gen(usize, u8),
    Exec(usize, u8),
    Eval(usize, u8),
    Clear(Stage),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let idx = 0..IDS.len();
    prop_oneof![
        (idx.clone(), any::<u8>()).prop_map(|(i, v)| Op::Gen(i, v)),
        (idx.clone(), any::<u8>()).prop_map(|(i, v)| Op::Exec(i, v)),
        (idx, any::<u8>()).prop_map(|(i, v)| Op::Eval(i, v)),
        prop_oneof![Just(Stage::Gen), Just(Stage::Exec), Just(Stage::Eval)].prop_map(Op::Clear),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
struct ModelRow {
    gen: Option<u8>,
    exec: Option<u8>,
    eval: Option<u8>,
}

fn run() -> RunConfig {
    RunConfig::new(Method::Llm, "cypher", "gpt-4o")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn engine_matches_cascade_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let engine = ResultStorageEngine::open_in_memory().unwrap();
        let mut model: [Option<ModelRow>; 3] = [None; 3];

        for op in &ops {
            match *op {
                Op::Gen(i, v) => {
                    engine.save_generation(&run().key_for(IDS[i]), &GenerationResult {
                        query_raw: None,
                        query: Some(v.to_string()),
                        stats: None,
                    }).unwrap();
                    model[i] = Some(ModelRow { gen: Some(v), exec: None, eval: None });
                }
                Op::Exec(i, v) => {
                    engine.save_execution(
                        &run().key_for(IDS[i]),
                        &ExecutionResult::succeeded(vec![json!(v)]),
                    ).unwrap();
                    let row = model[i].get_or_insert_with(ModelRow::default);
                    row.exec = Some(v);
                    row.eval = None;
                }
                Op::Eval(i, v) => {
                    engine.save_evaluation(&run().key_for(IDS[i]), &EvaluationResult {
                        f1: Some(f64::from(v)),
                        ..EvaluationResult::default()
                    }).unwrap();
                    model[i].get_or_insert_with(ModelRow::default).eval = Some(v);
                }
                Op::Clear(stage) => {
                    let mut expected = 0;
                    for row in model.iter_mut().flatten() {
                        let mut touched = false;
                        for s in stage.cascade() {
                            let slot = match s {
                                Stage::Gen => &mut row.gen,
                                Stage::Exec => &mut row.exec,
                                Stage::Eval => &mut row.eval,
                            };
                            touched |= slot.take().is_some();
                        }
                        expected += usize::from(touched);
                    }
                    prop_assert_eq!(engine.clear_stage(&run(), stage).unwrap(), expected);
                }
            }

            for (i, id) in IDS.iter().enumerate() {
                let stored = engine.get(&run().key_for(id)).unwrap();
                match (model[i], stored) {
                    (None, None) => {}
                    (Some(m), Some(row)) => {
                        prop_assert_eq!(
                            row.gen.and_then(|g| g.query),
                            m.gen.map(|v| v.to_string())
                        );
                        prop_assert_eq!(
                            row.exec.and_then(|e| e.result),
                            m.exec.map(|v| vec![json!(v)])
                        );
                        prop_assert_eq!(
                            row.eval.and_then(|e| e.f1),
                            m.eval.map(f64::from)
                        );
                    }
                    (m, s) => prop_assert!(false, "row presence mismatch: model {:?}, stored {:?}", m, s),
                }
            }
        }
    }
}
