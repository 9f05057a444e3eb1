mod args;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use polaris_client::PolarisClient;
use polaris_common::{CleanupFilters, ClusterConfig, LaunchOptions};

use crate::args::{Args, Command};
use crate::output::{
    print_batch_outcomes, print_cleanup, print_launch, print_metrics, print_model_detail,
    print_models, print_status,
};

#[tokio::main]
async fn main() -> Result<()> {
    polaris_common::telemetry::init_tracing();

    let args = Args::parse();
    let cluster = ClusterConfig::default();
    let models_file = args
        .models_file
        .clone()
        .unwrap_or_else(|| cluster.models_file.clone());
    let client = PolarisClient::new(&models_file, cluster)?;

    match args.command {
        Command::Launch {
            model_name,
            model_family,
            model_variant,
            partition,
            num_nodes,
            gpus_per_node,
            cpus_per_task,
            mem_per_node,
            account,
            qos,
            exclude,
            nodelist,
            time_limit,
            bind,
            engine_args,
            venv,
            log_dir,
            model_weights_parent_dir,
            image,
            json,
        } => {
            let opts = LaunchOptions {
                model_family,
                model_variant,
                partition,
                num_nodes,
                gpus_per_node,
                cpus_per_task,
                mem_per_node,
                account,
                qos,
                exclude,
                nodelist,
                time_limit,
                bind,
                engine_args,
                venv,
                log_dir,
                model_weights_parent_dir,
                image,
            };
            let resp = client.launch(&model_name, &opts).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print_launch(&resp);
            }
        }

        Command::BatchLaunch {
            model_names,
            batch_config,
            json,
        } => {
            let outcomes = client
                .launch_batch(&model_names, batch_config.as_deref())
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcomes)?);
            } else {
                print_batch_outcomes(&outcomes);
            }
            if outcomes.iter().any(|o| !o.succeeded()) {
                std::process::exit(1);
            }
        }

        Command::Status { job_id, json } => {
            let status = client.get_status(job_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Command::Shutdown { job_id } => {
            client.shutdown(job_id).await?;
            println!("Shutting down model with job id: {job_id}");
        }

        Command::List { model_name, json } => match model_name {
            Some(name) => {
                let entry = client.get_model_config(&name)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(entry)?);
                } else {
                    print_model_detail(entry);
                }
            }
            None => {
                let models = client.list_models();
                if json {
                    println!("{}", serde_json::to_string_pretty(&models)?);
                } else {
                    print_models(&models);
                }
            }
        },

        Command::Metrics { job_id, watch } => {
            // The continuous case is plain caller-driven polling: one
            // stateless query per tick, cancelled by interrupting the
            // process.
            loop {
                let resp = client.get_metrics(job_id).await?;
                print_metrics(&resp);
                if !watch {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }

        Command::Cleanup {
            log_dir,
            model_family,
            model_name,
            job_id,
            before_job_id,
            dry_run,
        } => {
            let filters = CleanupFilters {
                model_family,
                model_name,
                job_id,
                before_job_id,
            };
            let report = client
                .cleanup_logs(log_dir.as_deref(), &filters, dry_run)
                .await?;
            print_cleanup(&report);
        }
    }

    Ok(())
}
