use std::borrow::Cow;
use std::fmt;

use crate::error::{Result, SparkError};

/// A `LOAD DATA` statement moving files into a (partitioned) table.
///
/// Defaults to a local, overwriting load:
///
/// ```
/// use spark_executor::spark::LoadData;
///
/// let load = LoadData::new("/data/events.log", "db", "events").partition("dt", "20160501");
/// assert_eq!(
///     load.to_string(),
///     "load data local inpath '/data/events.log' overwrite into table db.events partition (dt='20160501');"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadData {
    pub path: String,
    pub database: String,
    pub table: String,
    pub partitions: Vec<(String, String)>,
    pub local: bool,
    pub overwrite: bool,
}

impl LoadData {
    pub fn new(
        path: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            database: database.into(),
            table: table.into(),
            partitions: Vec::new(),
            local: true,
            overwrite: true,
        }
    }

    /// Add a partition column value. Order of calls is the order in the statement.
    pub fn partition(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.partitions.push((key.into(), value.into()));
        self
    }

    pub fn partitions<I, K, V>(mut self, partitions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.partitions
            .extend(partitions.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("path", &self.path),
            ("database", &self.database),
            ("table", &self.table),
        ] {
            if value.trim().is_empty() {
                return Err(SparkError::MissingArgument(format!(
                    "load data requires a {name}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for LoadData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("load data ")?;
        if self.local {
            f.write_str("local ")?;
        }
        write!(f, "inpath '{}' ", escape_literal(&self.path))?;
        if self.overwrite {
            f.write_str("overwrite ")?;
        }
        write!(f, "into table {}.{}", self.database, self.table)?;

        if !self.partitions.is_empty() {
            let spec = self
                .partitions
                .iter()
                .map(|(key, value)| format!("{}='{}'", key, escape_literal(value)))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, " partition ({spec})")?;
        }

        f.write_str(";")
    }
}

fn escape_literal(value: &str) -> Cow<'_, str> {
    if value.contains(['\\', '\'']) {
        Cow::Owned(value.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        Cow::Borrowed(value)
    }
}
