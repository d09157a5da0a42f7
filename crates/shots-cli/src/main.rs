use std::env;
use std::process;

use shots_cli::types::ReplayConfig;
use shots_cli::ReplayProcessor;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args();
    let _bin = args.next();
    let Some(motion_path) = args.next() else {
        eprintln!("usage: shots-replay <raw_motion.csv> [config.yaml] [output-dir]");
        process::exit(2);
    };

    let mut config = match args.next() {
        Some(path) => match ReplayConfig::from_yaml_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(config = %path, "invalid config: {err}");
                process::exit(2);
            }
        },
        None => ReplayConfig::default(),
    };
    if let Some(dir) = args.next() {
        config.output_dir = dir.into();
    }

    let processor = ReplayProcessor::new(config);
    let result = processor
        .process_session(&motion_path)
        .and_then(|(output, export)| {
            let written = processor.write_outputs(&output, export.as_deref())?;
            Ok((output, written))
        });

    match result {
        Ok((output, written)) => {
            info!(session = %output.metadata.session_name, "replay finished");
            println!("session: {}", output.metadata.session_name);
            println!("type: {}", output.session.session_type);
            println!("elapsed (s): {}", output.session.elapsed_seconds);
            if let Some(motion) = &output.motion {
                println!("samples: {}", motion.sample_count);
                println!("mean vertical acceleration (g): {:.4}", motion.mean_vertical_acceleration);
            }
            if let Some(path) = written.export {
                println!("export: {}", path.display());
            }
            println!("summary: {}", written.summary.display());
        }
        Err(err) => {
            error!(motion = %motion_path, "replay failed: {err}");
            process::exit(1);
        }
    }
}
