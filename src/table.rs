use std::path::Path;

use anyhow::{
    bail,
    Context,
};

use crate::types::Result;


/// A small column-addressable view of a CSV file, enough for the histogram
/// command. All cells are kept as text; numeric interpretation happens at
/// the point of use.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}


impl Table {
    pub fn from_csv(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Data file {:?} not found.", path);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .context(format!("Failed to open data file {:?}.", path))?;

        let headers = reader.headers()
            .context("Failed to read the CSV header row.")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read a CSV record.")?;
            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Cells of a named column, top to bottom. Rows too short to carry the
    /// column yield an empty cell.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.headers.iter()
            .position(|h| h == name)
            .with_context(|| format!(
                "No column named '{}'; available columns: {}.",
                name, self.headers.join(", ")))?;

        Ok(self.rows.iter()
               .map(|r| r.get(idx).map(|c| c.as_str()).unwrap_or(""))
               .collect())
    }
}
