use crate::model::Sample;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

#[async_trait]
pub trait Sensor: Send + Sync {
    async fn read(&self) -> Result<Sample>;
}

/// Runs an external reader program once per call. The program prints either
/// a JSON object `{"temperature": .., "humidity": .., "pressure": ..}` or a
/// `temp,hum[,pres]` line.
#[derive(Debug, Clone)]
pub struct CommandSensor {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSensor {
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("sensor command is empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl Sensor for CommandSensor {
    async fn read(&self) -> Result<Sample> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program).args(&self.args).kill_on_drop(true).output(),
        )
        .await
        .map_err(|_| anyhow!("sensor command timed out after {:?}", self.timeout))?
        .with_context(|| format!("failed to run sensor command {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("sensor command exited with {}: {}", output.status, stderr.trim());
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(output = %stdout.trim(), "sensor command output");
        parse_sample(&stdout)
    }
}

/// Parse the last non-empty line of reader output.
pub fn parse_sample(output: &str) -> Result<Sample> {
    let line = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| anyhow!("sensor produced no output"))?;

    let sample = if line.starts_with('{') {
        serde_json::from_str::<Sample>(line).context("invalid sensor JSON")?
    } else {
        let fields: Vec<f64> = line
            .split(',')
            .map(|f| f.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .with_context(|| format!("invalid sensor line '{line}'"))?;
        match fields.as_slice() {
            [t, h] => Sample { temperature: *t, humidity: *h, pressure: None },
            [t, h, p] => Sample { temperature: *t, humidity: *h, pressure: Some(*p) },
            _ => bail!("expected 2 or 3 values, got {}", fields.len()),
        }
    };

    if !sample.temperature.is_finite() || !sample.humidity.is_finite() {
        bail!("sensor returned a non-finite value");
    }
    if !(0.0..=100.0).contains(&sample.humidity) {
        bail!("humidity {} out of range", sample.humidity);
    }
    Ok(sample)
}
