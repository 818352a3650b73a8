//! JSON and CSV export of metric reports

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    metric::{ActorReport, MetricReport},
};

/// One CSV row: an actor with its index statistics flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCsvRecord {
    pub actor: usize,
    pub l_gop: f64,
    pub gop_accuracy: f64,
    pub gop_q1: f64,
    pub gop_median: f64,
    pub gop_q3: f64,
    pub gop_iqr: f64,
    pub l_rp: f64,
    pub rp_accuracy: f64,
    pub rp_q1: f64,
    pub rp_median: f64,
    pub rp_q3: f64,
    pub rp_iqr: f64,
}

impl From<&ActorReport> for ActorCsvRecord {
    fn from(a: &ActorReport) -> Self {
        Self {
            actor: a.actor,
            l_gop: a.l_gop,
            gop_accuracy: a.gop_accuracy,
            gop_q1: a.gop.q1,
            gop_median: a.gop.median,
            gop_q3: a.gop.q3,
            gop_iqr: a.gop.iqr,
            l_rp: a.l_rp,
            rp_accuracy: a.rp_accuracy,
            rp_q1: a.rp.q1,
            rp_median: a.rp.median,
            rp_q3: a.rp.q3,
            rp_iqr: a.rp.iqr,
        }
    }
}

/// Writes and reads [`MetricReport`] files.
pub struct ReportExporter;

impl ReportExporter {
    /// Pretty-printed JSON with per-actor entries and the batch summary.
    pub fn write_json(report: &MetricReport, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<MetricReport> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// One row per actor; the summary is not written.
    pub fn write_csv(report: &MetricReport, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for actor in &report.actors {
            writer.serialize(ActorCsvRecord::from(actor))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Vec<ActorCsvRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ActorCsvRecord>, csv::Error>>()?;
        Ok(records)
    }
}
