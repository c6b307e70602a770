use std::fs::File;
use std::io::prelude::*;
use std::path::Path;


/// Values recorded at the end of one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// 1-indexed epoch number.
    pub epoch: usize,
    /// Mean training loss over the epoch.
    pub loss: f32,
    /// Training metrics, in compile order.
    pub metrics: Vec<(String, f32)>,
    /// Validation loss, if there is a validation split.
    pub val_loss: Option<f32>,
    /// Validation metrics, in compile order.
    pub val_metrics: Vec<(String, f32)>,
    /// Cumulative training time in milliseconds.
    pub time_ms: u128,
}


/// Struct `History` keeps the per-epoch records of
/// [`Sequential::fit`](super::Sequential::fit).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// One record per epoch.
    pub epochs: Vec<EpochRecord>,
}


impl History {
    /// The record of the last epoch.
    pub fn last(&self) -> Option<&EpochRecord> {
        self.epochs.last()
    }


    /// Training losses, one per epoch.
    pub fn losses(&self) -> Vec<f32> {
        self.epochs.iter().map(|r| r.loss).collect()
    }


    /// Write the history as CSV.
    /// The columns are `Epoch,Loss,<metrics>,ValLoss,<val metrics>,Time`.
    pub fn write_csv<P: AsRef<Path>>(&self, filename: P) -> std::io::Result<()> {
        let mut file = File::create(filename)?;

        let Some(first) = self.epochs.first() else { return Ok(()); };
        let mut header = vec!["Epoch".to_string(), "Loss".to_string()];
        header.extend(first.metrics.iter().map(|(name, _)| name.clone()));
        header.push("ValLoss".to_string());
        header.extend(first.val_metrics.iter().map(|(name, _)| format!("val_{name}")));
        header.push("Time".to_string());
        writeln!(file, "{}", header.join(","))?;

        for record in &self.epochs {
            let mut line = vec![record.epoch.to_string(), record.loss.to_string()];
            line.extend(record.metrics.iter().map(|(_, v)| v.to_string()));
            line.push(record.val_loss.map_or_else(String::new, |v| v.to_string()));
            line.extend(record.val_metrics.iter().map(|(_, v)| v.to_string()));
            line.push(record.time_ms.to_string());
            writeln!(file, "{}", line.join(","))?;
        }
        Ok(())
    }
}
