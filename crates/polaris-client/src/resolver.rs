use polaris_common::{
    ClientError, ClusterConfig, LaunchOptions, LaunchSpec, ModelEntry, ResourceShape, Result,
};

use crate::registry::ModelRegistry;

/// Merge user overrides with registry and cluster defaults into a fully
/// resolved launch spec.
///
/// Precedence, highest first: explicit user override, registry entry for
/// the named model, cluster-wide default. A model absent from the registry
/// can still be launched when the overrides form a complete standalone
/// specification (family, variant and resource shape).
pub fn resolve(
    registry: &ModelRegistry,
    cluster: &ClusterConfig,
    model_name: &str,
    opts: &LaunchOptions,
) -> Result<LaunchSpec> {
    let entry = registry.lookup(model_name);

    let (family, variant) = match entry {
        Some(e) => (
            opts.model_family.clone().unwrap_or_else(|| e.family.clone()),
            opts.model_variant
                .clone()
                .unwrap_or_else(|| e.variant.clone()),
        ),
        None => {
            // Standalone launch: the overrides must identify the model and
            // its resource shape on their own.
            let complete = opts.model_family.is_some()
                && opts.model_variant.is_some()
                && opts.num_nodes.is_some()
                && opts.gpus_per_node.is_some();
            if !complete {
                return Err(ClientError::UnknownModel(model_name.to_string()));
            }
            (
                opts.model_family.clone().unwrap_or_default(),
                opts.model_variant.clone().unwrap_or_default(),
            )
        }
    };

    let num_nodes = opts
        .num_nodes
        .or_else(|| entry.and_then(|e| e.num_nodes))
        .unwrap_or(1);
    let gpus_per_node = opts
        .gpus_per_node
        .or_else(|| entry.and_then(|e| e.gpus_per_node))
        .unwrap_or(1);
    let cpus_per_task = opts
        .cpus_per_task
        .or_else(|| entry.and_then(|e| e.cpus_per_task))
        .unwrap_or(cluster.default_cpus_per_task);

    check_bound("num_nodes", num_nodes, cluster.max_num_nodes)?;
    check_bound("gpus_per_node", gpus_per_node, cluster.max_gpus_per_node)?;
    check_bound("cpus_per_task", cpus_per_task, cluster.max_cpus_per_task)?;

    let mem_per_node = opts
        .mem_per_node
        .clone()
        .or_else(|| entry.and_then(|e| e.mem_per_node.clone()))
        .unwrap_or_else(|| cluster.default_mem_per_node.clone());

    let partition = opts
        .partition
        .clone()
        .or_else(|| entry.and_then(|e| e.partition.clone()))
        .unwrap_or_else(|| cluster.default_partition.clone());
    let qos = opts
        .qos
        .clone()
        .or_else(|| entry.and_then(|e| e.qos.clone()))
        .unwrap_or_else(|| cluster.default_qos.clone());
    let time_limit = opts
        .time_limit
        .clone()
        .or_else(|| entry.and_then(|e| e.time_limit.clone()))
        .unwrap_or_else(|| cluster.default_time_limit.clone());

    let image = opts
        .image
        .clone()
        .or_else(|| entry.and_then(|e| e.image.clone()))
        .unwrap_or_else(|| cluster.default_image.clone());
    let weights_parent = opts
        .model_weights_parent_dir
        .clone()
        .or_else(|| entry.and_then(|e| e.model_weights_parent_dir.clone()))
        .unwrap_or_else(|| cluster.default_weights_parent_dir.clone());

    let binds = split_list("bind", opts.bind.as_deref())?;
    let engine_args = split_list("engine_args", opts.engine_args.as_deref())?;

    let log_root = opts
        .log_dir
        .clone()
        .unwrap_or_else(|| cluster.default_log_root.clone());

    Ok(LaunchSpec {
        model_name: model_name.to_string(),
        model_family: family,
        model_variant: variant,
        resources: ResourceShape {
            num_nodes,
            gpus_per_node,
            cpus_per_task,
            mem_per_node,
        },
        partition,
        qos,
        time_limit,
        account: opts.account.clone(),
        exclude: opts.exclude.clone(),
        nodelist: opts.nodelist.clone(),
        image,
        weights_path: weights_parent.join(model_name),
        binds,
        engine_args,
        venv: opts.venv.clone(),
        log_root,
    })
}

fn check_bound(field: &'static str, value: u32, max: u32) -> Result<()> {
    if value < 1 || value > max {
        return Err(ClientError::InvalidResource { field, value, max });
    }
    Ok(())
}

/// Split a comma-separated option value into an ordered list. Empty
/// segments (leading, trailing or doubled commas) are rejected rather than
/// silently dropped.
fn split_list(field: &'static str, value: Option<&str>) -> Result<Vec<String>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for segment in value.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(ClientError::InvalidOption {
                field,
                reason: format!("empty segment in list '{value}'"),
            });
        }
        out.push(segment.to_string());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry() -> (ModelRegistry, tempfile::NamedTempFile) {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(
            br#"
models:
  llama-7b:
    family: llama
    variant: 7b
    num_nodes: 1
    gpus_per_node: 2
    cpus_per_task: 8
    mem_per_node: 32G
    qos: high
    time_limit: "04:00:00"
"#,
        )
        .unwrap();
        let reg = ModelRegistry::load(f.path()).unwrap();
        (reg, f)
    }

    #[test]
    fn no_overrides_reproduces_registry_defaults() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let spec = resolve(&reg, &cluster, "llama-7b", &LaunchOptions::default()).unwrap();

        assert_eq!(spec.model_family, "llama");
        assert_eq!(spec.resources.num_nodes, 1);
        assert_eq!(spec.resources.gpus_per_node, 2);
        assert_eq!(spec.resources.cpus_per_task, 8);
        assert_eq!(spec.resources.mem_per_node, "32G");
        assert_eq!(spec.qos, "high");
        assert_eq!(spec.time_limit, "04:00:00");
        // Registry is silent on these; cluster defaults apply.
        assert_eq!(spec.partition, cluster.default_partition);
        assert_eq!(spec.log_root, cluster.default_log_root);
        assert_eq!(
            spec.weights_path,
            cluster.default_weights_parent_dir.join("llama-7b")
        );
    }

    #[test]
    fn override_takes_precedence_over_registry() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let opts = LaunchOptions {
            gpus_per_node: Some(4),
            qos: Some("scavenger".into()),
            ..Default::default()
        };
        let spec = resolve(&reg, &cluster, "llama-7b", &opts).unwrap();
        assert_eq!(spec.resources.gpus_per_node, 4);
        assert_eq!(spec.qos, "scavenger");
        // Untouched fields still come from the registry.
        assert_eq!(spec.resources.num_nodes, 1);
    }

    #[test]
    fn resource_bounds_are_enforced() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();

        let opts = LaunchOptions {
            gpus_per_node: Some(cluster.max_gpus_per_node + 1),
            ..Default::default()
        };
        match resolve(&reg, &cluster, "llama-7b", &opts).unwrap_err() {
            ClientError::InvalidResource { field, max, .. } => {
                assert_eq!(field, "gpus_per_node");
                assert_eq!(max, cluster.max_gpus_per_node);
            }
            other => panic!("unexpected error: {other}"),
        }

        let opts = LaunchOptions {
            num_nodes: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&reg, &cluster, "llama-7b", &opts).unwrap_err(),
            ClientError::InvalidResource {
                field: "num_nodes",
                ..
            }
        ));
    }

    #[test]
    fn unknown_model_without_standalone_spec_is_rejected() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let err = resolve(&reg, &cluster, "mystery", &LaunchOptions::default()).unwrap_err();
        assert!(matches!(err, ClientError::UnknownModel(_)));
    }

    #[test]
    fn unknown_model_with_complete_overrides_resolves() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let opts = LaunchOptions {
            model_family: Some("qwen".into()),
            model_variant: Some("14b".into()),
            num_nodes: Some(1),
            gpus_per_node: Some(4),
            ..Default::default()
        };
        let spec = resolve(&reg, &cluster, "qwen-14b", &opts).unwrap();
        assert_eq!(spec.model_family, "qwen");
        assert_eq!(spec.resources.cpus_per_task, cluster.default_cpus_per_task);
    }

    #[test]
    fn comma_lists_split_in_order() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let opts = LaunchOptions {
            engine_args: Some("--max-model-len=8192,--max-num-seqs=256".into()),
            bind: Some("/scratch:/scratch,/data".into()),
            ..Default::default()
        };
        let spec = resolve(&reg, &cluster, "llama-7b", &opts).unwrap();
        assert_eq!(
            spec.engine_args,
            vec!["--max-model-len=8192", "--max-num-seqs=256"]
        );
        assert_eq!(spec.binds, vec!["/scratch:/scratch", "/data"]);
    }

    #[test]
    fn empty_list_segment_is_rejected() {
        let (reg, _f) = registry();
        let cluster = ClusterConfig::default();
        let opts = LaunchOptions {
            bind: Some("/scratch,,/data".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve(&reg, &cluster, "llama-7b", &opts).unwrap_err(),
            ClientError::InvalidOption { field: "bind", .. }
        ));
    }
}
