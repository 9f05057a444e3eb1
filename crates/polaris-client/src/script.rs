//! Rendering of a resolved launch spec into an sbatch job script.
//!
//! The rendered script doubles as the container entrypoint wrapper: it
//! creates the per-job log directory once Slurm assigns the job id, starts
//! the inference server inside the container, and emits the readiness and
//! terminal markers defined in [`crate::logs`].

use std::fmt::Write;
use std::path::Path;

use polaris_common::LaunchSpec;

use crate::logs::{
    CANCELLED_MARKER, COMPLETE_MARKER, FAILED_MARKER, READY_MARKER, SERVER_LOG_FILE,
    SHUTDOWN_MARKER,
};

/// Port the server binds inside the job. The readiness marker carries the
/// actual host, so the client never hardcodes an address.
const SERVER_PORT: u16 = 8080;

/// Render `spec` into a job script. `model_dir` is the model-level log
/// directory (`{log_root}/{family}/{name}`) the script creates its per-job
/// subdirectory under.
pub fn render_script(spec: &LaunchSpec, model_dir: &Path) -> String {
    let mut s = String::with_capacity(2048);
    let model_dir = model_dir.display();

    s.push_str("#!/bin/bash\n");
    let _ = writeln!(s, "#SBATCH --job-name={}", spec.model_name);
    let _ = writeln!(s, "#SBATCH --partition={}", spec.partition);
    let _ = writeln!(s, "#SBATCH --qos={}", spec.qos);
    let _ = writeln!(s, "#SBATCH --time={}", spec.time_limit);
    let _ = writeln!(s, "#SBATCH --nodes={}", spec.resources.num_nodes);
    let _ = writeln!(s, "#SBATCH --gpus-per-node={}", spec.resources.gpus_per_node);
    let _ = writeln!(s, "#SBATCH --cpus-per-task={}", spec.resources.cpus_per_task);
    let _ = writeln!(s, "#SBATCH --mem={}", spec.resources.mem_per_node);
    if let Some(account) = &spec.account {
        let _ = writeln!(s, "#SBATCH --account={account}");
    }
    if let Some(exclude) = &spec.exclude {
        let _ = writeln!(s, "#SBATCH --exclude={exclude}");
    }
    if let Some(nodelist) = &spec.nodelist {
        let _ = writeln!(s, "#SBATCH --nodelist={nodelist}");
    }
    let _ = writeln!(s, "#SBATCH --output={model_dir}/slurm-%j.out");
    s.push('\n');

    let _ = writeln!(s, "LOG_DIR=\"{model_dir}/${{SLURM_JOB_ID}}\"");
    s.push_str("mkdir -p \"$LOG_DIR\"\n");
    let _ = writeln!(s, "LOG_FILE=\"$LOG_DIR/{SERVER_LOG_FILE}\"");
    s.push('\n');

    let _ = writeln!(s, "PORT={SERVER_PORT}");
    s.push_str("BASE_URL=\"http://$(hostname):${PORT}\"\n");
    s.push('\n');

    // scancel delivers SIGTERM; Slurm sets SLURM_JOB_PREEMPT when the kill
    // comes from preemption rather than an explicit cancel.
    s.push_str("on_term() {\n");
    s.push_str("    if [ -n \"${SLURM_JOB_PREEMPT:-}\" ]; then\n");
    let _ = writeln!(s, "        echo \"{CANCELLED_MARKER}\" >> \"$LOG_FILE\"");
    s.push_str("    else\n");
    let _ = writeln!(s, "        echo \"{SHUTDOWN_MARKER}\" >> \"$LOG_FILE\"");
    s.push_str("    fi\n");
    s.push_str("    kill \"$SERVER_PID\" 2>/dev/null\n");
    s.push_str("    exit 0\n");
    s.push_str("}\n");
    s.push_str("trap on_term TERM\n");
    s.push('\n');

    let python = match &spec.venv {
        Some(venv) => format!("{}/bin/python3", venv.display()),
        None => "python3".to_string(),
    };

    s.push_str("apptainer exec --nv \\\n");
    let _ = writeln!(
        s,
        "    --bind {}:{} \\",
        spec.weights_path.display(),
        spec.weights_path.display()
    );
    for bind in &spec.binds {
        let _ = writeln!(s, "    --bind {bind} \\");
    }
    let _ = writeln!(s, "    {} \\", spec.image.display());
    let _ = writeln!(s, "    {python} -m vllm.entrypoints.openai.api_server \\");
    let _ = writeln!(s, "        --model \"{}\" \\", spec.weights_path.display());
    let _ = writeln!(s, "        --served-model-name \"{}\" \\", spec.model_name);
    s.push_str("        --host 0.0.0.0 \\\n");
    s.push_str("        --port \"$PORT\" \\\n");
    for arg in &spec.engine_args {
        let _ = writeln!(s, "        {arg} \\");
    }
    s.push_str("    >> \"$LOG_FILE\" 2>&1 &\n");
    s.push_str("SERVER_PID=$!\n");
    s.push('\n');

    s.push_str("until curl -sf \"${BASE_URL}/health\" > /dev/null 2>&1; do\n");
    s.push_str("    if ! kill -0 \"$SERVER_PID\" 2>/dev/null; then\n");
    let _ = writeln!(
        s,
        "        echo \"{FAILED_MARKER} server exited during startup\" >> \"$LOG_FILE\""
    );
    s.push_str("        exit 1\n");
    s.push_str("    fi\n");
    s.push_str("    sleep 5\n");
    s.push_str("done\n");
    let _ = writeln!(s, "echo \"{READY_MARKER}${{BASE_URL}}\" >> \"$LOG_FILE\"");
    s.push('\n');

    s.push_str("wait \"$SERVER_PID\"\n");
    s.push_str("RC=$?\n");
    s.push_str("if [ \"$RC\" -eq 0 ]; then\n");
    let _ = writeln!(s, "    echo \"{COMPLETE_MARKER}\" >> \"$LOG_FILE\"");
    s.push_str("else\n");
    let _ = writeln!(
        s,
        "    echo \"{FAILED_MARKER} server exited with status $RC\" >> \"$LOG_FILE\""
    );
    s.push_str("fi\n");
    s.push_str("exit \"$RC\"\n");

    s
}

/// Resource fields recovered from a rendered script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResources {
    pub num_nodes: u32,
    pub gpus_per_node: u32,
    pub cpus_per_task: u32,
    pub time_limit: String,
}

/// Parse the `#SBATCH` resource lines back out of a rendered script.
pub fn parse_script(text: &str) -> Option<ParsedResources> {
    let mut num_nodes = None;
    let mut gpus_per_node = None;
    let mut cpus_per_task = None;
    let mut time_limit = None;

    for line in text.lines() {
        let Some(directive) = line.strip_prefix("#SBATCH --") else {
            continue;
        };
        let Some((key, value)) = directive.split_once('=') else {
            continue;
        };
        match key {
            "nodes" => num_nodes = value.trim().parse().ok(),
            "gpus-per-node" => gpus_per_node = value.trim().parse().ok(),
            "cpus-per-task" => cpus_per_task = value.trim().parse().ok(),
            "time" => time_limit = Some(value.trim().to_string()),
            _ => {}
        }
    }

    Some(ParsedResources {
        num_nodes: num_nodes?,
        gpus_per_node: gpus_per_node?,
        cpus_per_task: cpus_per_task?,
        time_limit: time_limit?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_common::ResourceShape;
    use std::path::PathBuf;

    fn spec() -> LaunchSpec {
        LaunchSpec {
            model_name: "llama-7b".into(),
            model_family: "llama".into(),
            model_variant: "7b".into(),
            resources: ResourceShape {
                num_nodes: 2,
                gpus_per_node: 4,
                cpus_per_task: 16,
                mem_per_node: "64G".into(),
            },
            partition: "gpu".into(),
            qos: "normal".into(),
            time_limit: "08:00:00".into(),
            account: Some("ml-group".into()),
            exclude: None,
            nodelist: None,
            image: PathBuf::from("/opt/containers/polaris-inference.sif"),
            weights_path: PathBuf::from("/model-weights/llama-7b"),
            binds: vec!["/scratch:/scratch".into()],
            engine_args: vec!["--max-model-len=8192".into()],
            venv: None,
            log_root: PathBuf::from("/logs"),
        }
    }

    #[test]
    fn render_parse_round_trip_recovers_resources() {
        let spec = spec();
        let text = render_script(&spec, Path::new("/logs/llama/llama-7b"));
        let parsed = parse_script(&text).unwrap();

        assert_eq!(parsed.num_nodes, spec.resources.num_nodes);
        assert_eq!(parsed.gpus_per_node, spec.resources.gpus_per_node);
        assert_eq!(parsed.cpus_per_task, spec.resources.cpus_per_task);
        assert_eq!(parsed.time_limit, spec.time_limit);
    }

    #[test]
    fn render_embeds_placement_and_engine_args() {
        let text = render_script(&spec(), Path::new("/logs/llama/llama-7b"));
        assert!(text.contains("#SBATCH --account=ml-group"));
        assert!(text.contains("--max-model-len=8192"));
        assert!(text.contains("--bind /scratch:/scratch"));
        assert!(text.contains("--served-model-name \"llama-7b\""));
        assert!(!text.contains("#SBATCH --exclude"));
    }

    #[test]
    fn render_emits_every_marker() {
        let text = render_script(&spec(), Path::new("/logs/llama/llama-7b"));
        for marker in [
            READY_MARKER,
            COMPLETE_MARKER,
            FAILED_MARKER,
            CANCELLED_MARKER,
            SHUTDOWN_MARKER,
        ] {
            assert!(text.contains(marker), "missing marker: {marker}");
        }
    }

    #[test]
    fn venv_switches_the_interpreter() {
        let mut spec = spec();
        spec.venv = Some(PathBuf::from("/home/user/venvs/inference"));
        let text = render_script(&spec, Path::new("/logs/llama/llama-7b"));
        assert!(text.contains("/home/user/venvs/inference/bin/python3 -m"));
    }
}
