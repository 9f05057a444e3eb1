use polaris_common::{
    CleanupReport, JobStatus, LaunchOutcome, LaunchResponse, MetricsResponse, ModelEntry,
};

pub fn print_launch(resp: &LaunchResponse) {
    println!("\n=== Launch: {} ===\n", resp.model_name);
    println!("  {:<22} {}", "Job ID", resp.job_id);
    println!("  {:<22} {}", "Family", resp.spec.model_family);
    println!("  {:<22} {}", "Variant", resp.spec.model_variant);
    println!("  {:<22} {}", "Partition", resp.spec.partition);
    println!("  {:<22} {}", "QoS", resp.spec.qos);
    println!("  {:<22} {}", "Time limit", resp.spec.time_limit);
    println!("  {:<22} {}", "Nodes", resp.spec.resources.num_nodes);
    println!("  {:<22} {}", "GPUs/node", resp.spec.resources.gpus_per_node);
    println!("  {:<22} {}", "CPUs/task", resp.spec.resources.cpus_per_task);
    println!("  {:<22} {}", "Memory/node", resp.spec.resources.mem_per_node);
    println!("  {:<22} {}", "Image", resp.spec.image.display());
    println!("  {:<22} {}", "Weights", resp.spec.weights_path.display());
    if !resp.spec.engine_args.is_empty() {
        println!("  {:<22} {}", "Engine args", resp.spec.engine_args.join(" "));
    }
    println!("  {:<22} {}", "Log directory", resp.log_dir.display());
    println!();
}

pub fn print_batch_outcomes(outcomes: &[LaunchOutcome]) {
    println!("\n=== Batch Launch ===\n");
    println!("{:<30} {:<12} {}", "Model", "Job ID", "Result");
    println!("{:-<75}", "");
    for outcome in outcomes {
        match (&outcome.job_id, &outcome.error) {
            (Some(job_id), _) => {
                println!("{:<30} {:<12} submitted", outcome.model_name, job_id);
            }
            (None, Some(error)) => {
                println!("{:<30} {:<12} {}", outcome.model_name, "-", error);
            }
            (None, None) => {
                println!("{:<30} {:<12} unknown", outcome.model_name, "-");
            }
        }
    }
    println!();
}

pub fn print_status(status: &JobStatus) {
    println!("\n=== Job {} ===\n", status.job_id);
    if let Some(model) = &status.model_name {
        println!("  {:<12} {}", "Model", model);
    }
    println!("  {:<12} {}", "State", status.state);
    if let Some(reason) = &status.reason {
        println!("  {:<12} {}", "Reason", reason);
    }
    if let Some(url) = &status.base_url {
        println!("  {:<12} {}", "Base URL", url);
    }
    println!();
}

pub fn print_models(models: &[&ModelEntry]) {
    println!("\n=== Available Models ===\n");
    if models.is_empty() {
        println!("No models found in the registry.");
        return;
    }
    println!("{:<28} {:<14} {:<12} {:<8} {:<10}", "Name", "Family", "Variant", "Nodes", "GPUs/node");
    println!("{:-<75}", "");
    for m in models {
        println!(
            "{:<28} {:<14} {:<12} {:<8} {:<10}",
            m.name,
            m.family,
            m.variant,
            m.num_nodes.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            m.gpus_per_node.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
        );
    }
    println!();
}

pub fn print_model_detail(m: &ModelEntry) {
    println!("\n=== Model: {} ===\n", m.name);
    println!("  {:<26} {}", "Family", m.family);
    println!("  {:<26} {}", "Variant", m.variant);
    print_opt(m.num_nodes.as_ref(), "Nodes");
    print_opt(m.gpus_per_node.as_ref(), "GPUs/node");
    print_opt(m.cpus_per_task.as_ref(), "CPUs/task");
    print_opt(m.mem_per_node.as_ref(), "Memory/node");
    print_opt(m.partition.as_ref(), "Partition");
    print_opt(m.qos.as_ref(), "QoS");
    print_opt(m.time_limit.as_ref(), "Time limit");
    print_opt(m.image.as_ref().map(|p| p.display()).as_ref(), "Image");
    print_opt(
        m.model_weights_parent_dir.as_ref().map(|p| p.display()).as_ref(),
        "Weights parent dir",
    );
    println!();
}

fn print_opt<T: std::fmt::Display>(value: Option<&T>, label: &str) {
    if let Some(v) = value {
        println!("  {:<26} {}", label, v);
    }
}

pub fn print_metrics(resp: &MetricsResponse) {
    match resp {
        MetricsResponse::Snapshot(snap) => {
            println!("\n=== Metrics at {} ===\n", snap.collected_at.format("%H:%M:%S"));
            println!("{:<48} {:>14}", "Metric", "Value");
            println!("{:-<63}", "");
            for (name, value) in &snap.metrics {
                println!("{:<48} {:>14.4}", name, value);
            }
        }
        MetricsResponse::Unavailable(text) => {
            println!("\nMetrics not available: {text}");
        }
    }
    println!();
}

pub fn print_cleanup(report: &CleanupReport) {
    if report.matched.is_empty() {
        if report.dry_run {
            println!("Dry run: no matching log directories found.");
        } else {
            println!("No matching log directories were deleted.");
        }
        return;
    }
    if report.dry_run {
        println!("Dry run: {} directories would be deleted:", report.matched.len());
        for dir in &report.matched {
            println!("  - {}", dir.display());
        }
        return;
    }
    println!("Deleted {} log directory(ies).", report.removed.len());
    if !report.failed.is_empty() {
        println!("{} directory(ies) could not be removed:", report.failed.len());
        for (dir, reason) in &report.failed {
            println!("  - {}: {}", dir.display(), reason);
        }
    }
}
