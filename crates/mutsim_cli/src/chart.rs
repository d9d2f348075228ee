//! Sinks that present a simulated trajectory against its equilibrium.

use anyhow::Result;
use mutsim_core::{equilibrium_annotation, ChainTrajectory, TrajectorySink};
use serde::Serialize;
use std::io::Write;

/// Number of generations shown by the console table.
const TABLE_ROWS: usize = 12;

/// Prints a sampled frequency table followed by the equilibrium line.
pub struct ConsoleChart<W: Write> {
    out: W,
}

impl<W: Write> ConsoleChart<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrajectorySink for ConsoleChart<W> {
    fn render(&mut self, trajectory: &ChainTrajectory, equilibrium: &[f64]) -> Result<()> {
        writeln!(self.out, "Allele frequency evolution")?;
        write!(self.out, "{:>10}", "generation")?;
        for i in 0..equilibrium.len() {
            write!(self.out, "{:>10}", format!("A{}", i + 1))?;
        }
        writeln!(self.out)?;

        for gen in sample_generations(trajectory.generations.len(), TABLE_ROWS) {
            write!(self.out, "{:>10}", gen)?;
            for value in &trajectory.generations[gen] {
                write!(self.out, "{:>10.4}", value)?;
            }
            writeln!(self.out)?;
        }

        write!(self.out, "{:>10}", "eq")?;
        for value in equilibrium {
            write!(self.out, "{:>10.4}", value)?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{}", equilibrium_annotation(equilibrium))?;
        if !trajectory.converged {
            writeln!(
                self.out,
                "did not converge in {} iterations",
                trajectory.iterations
            )?;
        }
        Ok(())
    }
}

/// Evenly spaced generation indices, always including the first and last.
fn sample_generations(total: usize, rows: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    if total <= rows || rows < 2 {
        return (0..total).collect();
    }
    let last = total - 1;
    let mut picks: Vec<usize> = (0..rows).map(|k| k * last / (rows - 1)).collect();
    picks.dedup();
    picks
}

#[derive(Debug, Serialize)]
struct Series {
    label: String,
    values: Vec<f64>,
    equilibrium: f64,
}

/// Chart payload for an external plotting front end.
#[derive(Debug, Serialize)]
pub struct ChartPayload {
    generations: usize,
    converged: bool,
    series: Vec<Series>,
    annotation: String,
}

impl ChartPayload {
    pub fn new(trajectory: &ChainTrajectory, equilibrium: &[f64]) -> Self {
        let series = equilibrium
            .iter()
            .enumerate()
            .map(|(i, &eq)| Series {
                label: format!("A{}", i + 1),
                values: trajectory.series(i).unwrap_or_default(),
                equilibrium: eq,
            })
            .collect();
        Self {
            generations: trajectory.generations.len(),
            converged: trajectory.converged,
            series,
            annotation: equilibrium_annotation(equilibrium),
        }
    }
}

/// Writes the [`ChartPayload`] as pretty JSON.
pub struct JsonChart<W: Write> {
    out: W,
}

impl<W: Write> JsonChart<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> TrajectorySink for JsonChart<W> {
    fn render(&mut self, trajectory: &ChainTrajectory, equilibrium: &[f64]) -> Result<()> {
        let payload = ChartPayload::new(trajectory, equilibrium);
        serde_json::to_writer_pretty(&mut self.out, &payload)?;
        writeln!(self.out)?;
        Ok(())
    }
}
