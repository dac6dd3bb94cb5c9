//! Scenario tests across specs, builders and built graphs.

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::errors::{codes, GraphError};
    use crate::graph::{GraphBuilder, GraphSpec, InputSpec, Operation};
    use crate::node::Node;
    use crate::operations::Unary;
    use crate::utils::round_to;

    const TASK_JSON: &str = r#"{
        "name": "task",
        "inputs": [{"name": "x1"}, {"name": "x2"}, {"name": "x3"}],
        "nodes": [
            {"name": "cube", "op": "pow", "base": "x3", "exponent": 3.0},
            {"name": "shifted", "op": "add", "lhs": "x2", "rhs": "cube"},
            {"name": "wave", "op": "sin", "arg": "shifted"},
            {"name": "scaled", "op": "mul", "lhs": "x2", "rhs": "wave"},
            {"name": "result", "op": "add", "lhs": "x1", "rhs": "scaled"}
        ]
    }"#;

    #[test]
    fn test_reference_computation_from_spec() {
        let graph = GraphSpec::from_json_str(TASK_JSON).unwrap().build().unwrap();
        assert_eq!(graph.output_name(), "result");

        let first = graph.evaluate([("x1", 1.0), ("x2", 2.0), ("x3", 3.0)]).unwrap();
        assert_eq!(round_to(first, 5), -0.32727);

        let second = graph.evaluate([("x1", 2.0), ("x2", 3.0), ("x3", 4.0)]).unwrap();
        assert_eq!(round_to(second, 5), -0.56656);
    }

    #[test]
    fn test_spec_and_builder_agree() {
        let from_spec = GraphSpec::from_json_str(TASK_JSON).unwrap().build().unwrap();
        let from_builder = GraphBuilder::new("task")
            .input("x1")
            .and_then(|b| b.input("x2"))
            .and_then(|b| b.input("x3"))
            .and_then(|b| b.node("cube", Operation::pow("x3", 3.0)))
            .and_then(|b| b.node("shifted", Operation::add("x2", "cube")))
            .and_then(|b| b.node("wave", Operation::sin("shifted")))
            .and_then(|b| b.node("scaled", Operation::mul("x2", "wave")))
            .and_then(|b| b.node("result", Operation::add("x1", "scaled")))
            .and_then(GraphBuilder::build)
            .unwrap();

        for graph in [&from_spec, &from_builder] {
            graph.set_many([("x1", 0.5), ("x2", -1.0), ("x3", 2.0)]).unwrap();
        }
        assert_eq!(from_spec.snapshot(), from_builder.snapshot());
        assert_eq!(from_spec.execution_order(), from_builder.execution_order());
    }

    #[test]
    fn test_only_affected_nodes_recompute() {
        let graph = GraphSpec::new("split")
            .with_input(InputSpec::new("a").with_value(1.0))
            .with_input(InputSpec::new("b").with_value(2.0))
            .with_node("left", Operation::pow("a", 2.0))
            .with_node("right", Operation::pow("b", 2.0))
            .with_node("total", Operation::add("left", "right"))
            .build()
            .unwrap();

        // Attach a counting node under "left" to observe recomputation.
        let calls = Rc::new(Cell::new(0));
        let left = graph.node("left").unwrap();
        let observer = {
            let calls = calls.clone();
            Unary::new(left, move |v| {
                calls.set(calls.get() + 1);
                v
            })
        };

        assert_eq!(graph.compute(), 5.0);
        assert_eq!(observer.compute(), 1.0);
        assert_eq!(calls.get(), 1);

        graph.set("b", 3.0).unwrap();
        assert_eq!(graph.compute(), 10.0);
        assert_eq!(observer.compute(), 1.0);
        assert_eq!(calls.get(), 1);

        graph.set("a", 2.0).unwrap();
        assert_eq!(observer.compute(), 4.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(graph.compute(), 13.0);
    }

    #[test]
    fn test_initial_values_from_spec() {
        let graph = GraphSpec::new("init")
            .with_input(InputSpec::new("x").with_value(4.0))
            .with_node("root", Operation::pow("x", 0.5))
            .build()
            .unwrap();
        assert_eq!(graph.compute(), 2.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TASK_JSON.as_bytes()).unwrap();

        let spec = GraphSpec::from_json_file(file.path()).unwrap();
        assert_eq!(spec.nodes.len(), 5);

        let reparsed = GraphSpec::from_json_str(&spec.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, spec);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GraphSpec::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }

    #[test]
    fn test_build_reports_cycles() {
        let json = r#"{
            "name": "loop",
            "inputs": [{"name": "x"}],
            "nodes": [
                {"name": "a", "op": "mul", "lhs": "x", "rhs": "b"},
                {"name": "b", "op": "sin", "arg": "a"}
            ]
        }"#;
        let err = GraphSpec::from_json_str(json).unwrap().build().unwrap_err();
        match err {
            GraphError::Validation(e) => {
                assert_eq!(e.code(), Some(codes::CYCLE));
                assert_eq!(e.nodes, vec!["a", "b", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inputs_only_graph() {
        let graph = GraphSpec::new("identity")
            .with_input(InputSpec::new("x"))
            .build()
            .unwrap();
        assert_eq!(graph.evaluate([("x", 7.5)]).unwrap(), 7.5);
    }

    #[test]
    fn test_graph_outlives_handles() {
        let sum = {
            let graph = GraphBuilder::new("g")
                .input("x")
                .and_then(|b| b.node("double", Operation::add("x", "x")))
                .and_then(GraphBuilder::build)
                .unwrap();
            graph.set("x", 3.0).unwrap();
            graph.node("double").unwrap()
        };
        // Operands are owned by the node, so the value survives the graph.
        assert_eq!(sum.compute(), 6.0);
    }
}
