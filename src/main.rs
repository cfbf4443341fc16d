// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cbperf::client::{ConnectionOptions, QueryOptions, SslMode, SyncGen};
use cbperf::client::latency::Operation;
use cbperf::config::Config;
use cbperf::files::{parse_version, ManagedFile, TimeTrackingFile};
use cbperf::operator::{
    AutoscalerTarget, CouchbaseBackupFile, CouchbaseBucketFile, CouchbaseClusterFile,
    HorizontalAutoscalerFile, MetricTargetType, OperatorConfigFile, OperatorPaths,
    SyncGatewayFile, WorkerFile,
};
use cbperf::settings::{ClusterSpec, TestConfig};

#[derive(Parser)]
#[command(name = "cbperf")]
#[command(about = "Renders Couchbase Autonomous Operator manifests for performance tests")]
struct Cli {
    /// Directory holding the operator templates
    #[arg(long, global = true, env = "CBPERF_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Directory rendered manifests are written to
    #[arg(long, global = true, env = "CBPERF_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file collecting operation timings
    #[arg(long, global = true, env = "CBPERF_TIMINGS_FILE")]
    timings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Settings {
    /// Cluster spec INI file
    #[arg(long)]
    cluster_spec: PathBuf,

    /// Test config INI file
    #[arg(long)]
    test_config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the operator, admission controller and RBAC manifests
    OperatorConfig {
        #[arg(long)]
        operator_version: String,
        #[arg(long)]
        operator_image: String,
        #[arg(long)]
        controller_image: String,
    },
    /// Render the CouchbaseCluster manifest
    Cluster {
        #[command(flatten)]
        settings: Settings,
        #[arg(long)]
        operator_version: Option<String>,
        #[arg(long)]
        server_image: String,
        #[arg(long)]
        server_count: u32,
        /// Omit to disable backups
        #[arg(long)]
        backup_image: Option<String>,
        /// Omit to disable the Prometheus exporter
        #[arg(long)]
        exporter_image: Option<String>,
        #[arg(long, default_value_t = 60)]
        refresh_rate: u32,
        /// Cloud native gateway image (operator 2.6.0 and later)
        #[arg(long)]
        cng_image: Option<String>,
        /// Server group to enable autoscaling on
        #[arg(long)]
        autoscale_group: Option<String>,
    },
    /// Render a CouchbaseBucket manifest
    Bucket {
        #[arg(long)]
        test_config: PathBuf,
        #[arg(long, default_value = "bucket-1")]
        name: String,
        /// Memory quota in MiB, defaults to the cluster data quota
        #[arg(long)]
        quota: Option<u64>,
    },
    /// Render the CouchbaseBackup manifest
    Backup {
        /// Cron schedule of the full backup
        #[arg(long)]
        schedule: String,
    },
    /// Render a HorizontalPodAutoscaler for a server group
    Autoscaler {
        #[arg(long)]
        cluster_name: String,
        #[arg(long)]
        server_group: String,
        #[arg(long, default_value_t = 1)]
        min_replicas: i32,
        #[arg(long)]
        max_replicas: i32,
        #[arg(long)]
        metric: String,
        #[arg(long, default_value_t = MetricTargetType::Value)]
        target_type: MetricTargetType,
        #[arg(long)]
        target_value: String,
    },
    /// Render the load generator worker deployment
    Worker {
        #[arg(long)]
        cluster_spec: PathBuf,
    },
    /// Render the Sync Gateway manifests
    SyncGateway {
        #[arg(long)]
        image: String,
        #[arg(long, default_value_t = 1)]
        nodes: i32,
    },
    /// Record the duration of an externally timed operation
    RecordTiming {
        #[arg(long)]
        operation: String,
        #[arg(long)]
        seconds: f64,
    },
    /// Run a N1QL statement and report its latency
    Query {
        #[arg(long)]
        host: String,
        #[arg(long, env = "CBPERF_USERNAME")]
        username: String,
        #[arg(long, env = "CBPERF_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        bucket: String,
        #[arg(long, default_value = "none")]
        ssl_mode: String,
        #[arg(long)]
        statement: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.template_dir {
        config.template_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(file) = cli.timings_file {
        config.timings_file = file;
    }
    let paths = OperatorPaths::from_config(&config);

    match cli.command {
        Commands::OperatorConfig {
            operator_version,
            operator_image,
            controller_image,
        } => {
            let mut file =
                OperatorConfigFile::new(&paths, &operator_version, &operator_image, &controller_image);
            file.scoped(|f| f.setup_config())
                .context("Failed to render operator config")?;
        }
        Commands::Cluster {
            settings,
            operator_version,
            server_image,
            server_count,
            backup_image,
            exporter_image,
            refresh_rate,
            cng_image,
            autoscale_group,
        } => {
            let cluster_spec = ClusterSpec::load(&settings.cluster_spec)
                .with_context(|| format!("Failed to read {}", settings.cluster_spec.display()))?;
            let test_config = TestConfig::load(&settings.test_config)
                .with_context(|| format!("Failed to read {}", settings.test_config.display()))?;
            let version = operator_version
                .as_deref()
                .map(parse_version)
                .transpose()
                .context("Invalid operator version")?;

            let mut file = CouchbaseClusterFile::new(&paths, version, &cluster_spec, &test_config);
            file.scoped(|f| {
                f.set_server_spec(&server_image, server_count)?;
                f.set_backup(backup_image.as_deref())?;
                f.set_exporter(exporter_image.as_deref(), refresh_rate)?;
                f.set_memory_quota()?;
                f.set_index_settings()?;
                f.set_services()?;
                f.configure_auto_compaction()?;
                f.set_auto_failover()?;
                f.set_cpu_settings();
                f.set_memory_settings();
                if let Some(group) = &autoscale_group {
                    f.configure_autoscaling(group);
                }
                if let Some(image) = &cng_image {
                    f.set_cng_version(image)?;
                }
                Ok(())
            })
            .context("Failed to render cluster manifest")?;
            info!("Rendered cluster {}", file.cluster_name());
        }
        Commands::Bucket {
            test_config,
            name,
            quota,
        } => {
            let test_config = TestConfig::load(&test_config)
                .with_context(|| format!("Failed to read {}", test_config.display()))?;
            let quota = quota.unwrap_or(test_config.cluster.mem_quota);
            let mut file = CouchbaseBucketFile::new(&paths, &name);
            file.scoped(|f| f.set_bucket_settings(quota, &test_config.bucket))
                .with_context(|| format!("Failed to render bucket {name}"))?;
        }
        Commands::Backup { schedule } => {
            let mut file = CouchbaseBackupFile::new(&paths);
            file.scoped(|f| f.set_schedule_time(&schedule))
                .context("Failed to render backup manifest")?;
        }
        Commands::Autoscaler {
            cluster_name,
            server_group,
            min_replicas,
            max_replicas,
            metric,
            target_type,
            target_value,
        } => {
            let target = AutoscalerTarget {
                cluster_name,
                server_group,
                min_replicas,
                max_replicas,
                metric,
                target_type,
                target_value,
            };
            let mut file = HorizontalAutoscalerFile::new(&paths);
            file.scoped(|f| f.setup_pod_autoscaler(&target))
                .context("Failed to render autoscaler")?;
        }
        Commands::Worker { cluster_spec } => {
            let cluster_spec = ClusterSpec::load(&cluster_spec)
                .with_context(|| format!("Failed to read {}", cluster_spec.display()))?;
            let mut file = WorkerFile::new(&paths, &cluster_spec);
            file.scoped(|f| f.update_worker_spec())
                .context("Failed to render worker deployment")?;
        }
        Commands::SyncGateway { image, nodes } => {
            let mut file = SyncGatewayFile::new(&paths, &image, nodes);
            file.scoped(|f| f.configure_sgw())
                .context("Failed to render sync gateway manifests")?;
        }
        Commands::RecordTiming { operation, seconds } => {
            let elapsed = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("Invalid duration {seconds}"))?;
            TimeTrackingFile::new(&config.timings_file)
                .record(&operation, elapsed)
                .with_context(|| format!("Failed to update {}", config.timings_file.display()))?;
        }
        Commands::Query {
            host,
            username,
            password,
            bucket,
            ssl_mode,
            statement,
        } => {
            let mut options = ConnectionOptions::new(&host, &username, &password, &bucket);
            options.ssl_mode = ssl_mode.parse::<SslMode>()?;
            let client = SyncGen::connect(&options).context("Failed to connect")?;

            match client.n1ql_query(&statement, &QueryOptions::default())? {
                Some(rows) => {
                    for row in rows {
                        println!("{row}");
                    }
                }
                None => info!("Query failed, see the warning above"),
            }
            if let Some(summary) = client.latencies().summary(Operation::Query) {
                info!("Query latency: {:?}", summary.mean);
            }
        }
    }

    Ok(())
}
