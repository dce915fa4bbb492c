//! Main store implementation.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use thermolog_types::AppConfig;

use crate::error::{Error, Result};
use crate::models::{
    DailyReading, DateRange, LogEntry, Statistics, TimedReading, ValueDatePair, WeekSeries,
};
use crate::schema;
use crate::timefmt;

/// SQLite-based store for sensor readings, the error log, and the
/// singleton configuration row.
///
/// The store owns a single connection; callers serialize access to it
/// (the service wraps it in a mutex). Every mutating statement is
/// atomic on its own, which is all the integrity this schema needs —
/// no operation spans more than one logical row set.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Flush the write-ahead log into the main database file.
    ///
    /// Under WAL mode committed rows sit in the `-wal` sidecar until a
    /// checkpoint runs; anything that copies or serves the main file as
    /// a standalone database must checkpoint first or the copy is
    /// stale.
    pub fn checkpoint(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        debug!("WAL checkpoint completed");
        Ok(())
    }
}

// Reading operations
impl Store {
    /// Append one reading. Values are stored as given; no range
    /// validation happens here.
    pub fn insert_reading(
        &self,
        temperature: f64,
        humidity: f64,
        date: &str,
        time: &str,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sensor_data (temperature, humidity, timestamp_date, timestamp_time)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![temperature, humidity, date, time],
        )?;
        Ok(())
    }

    /// Per-date averages over every reading in the store, ascending by
    /// date. Days with many readings collapse to one averaged row.
    pub fn all_readings(&self) -> Result<Vec<DailyReading>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp_date, AVG(temperature), AVG(humidity)
             FROM sensor_data
             GROUP BY timestamp_date
             ORDER BY timestamp_date",
        )?;

        let readings = stmt
            .query_map([], daily_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Per-date averages restricted to one calendar month.
    ///
    /// Bounds come from the real month length (leap-aware). Days
    /// without readings are absent from the result; the monthly view
    /// deliberately does not backfill (the weekly one does).
    pub fn readings_for_month(
        &self,
        year: i32,
        month: u8,
        cfg: &AppConfig,
    ) -> Result<Vec<DailyReading>> {
        let (start, end) = timefmt::month_bounds(year, month, &cfg.dateformat)?;
        debug!("monthly query {} .. {}", start, end);
        self.averaged_between(&start, &end)
    }

    /// One ISO week of daily averages: exactly 7 buckets in Monday to
    /// Sunday order, `(None, None)` where no readings exist.
    ///
    /// This is the only bucketing query with a fixed-length, gap-filled
    /// result; the weekly chart needs 7 aligned points.
    pub fn readings_for_week(&self, label: &str, cfg: &AppConfig) -> Result<WeekSeries> {
        let dates = timefmt::iso_week_dates(label, &cfg.iso_week_format, &cfg.dateformat)?;

        let rows = self.averaged_between(&dates[0], &dates[6])?;
        let by_date: HashMap<String, (f64, f64)> = rows
            .into_iter()
            .map(|r| (r.date, (r.temperature, r.humidity)))
            .collect();

        let mut temperatures = Vec::with_capacity(7);
        let mut humidities = Vec::with_capacity(7);
        for date in &dates {
            match by_date.get(date) {
                Some(&(t, h)) => {
                    temperatures.push(Some(t));
                    humidities.push(Some(h));
                }
                None => {
                    temperatures.push(None);
                    humidities.push(None);
                }
            }
        }

        Ok(WeekSeries {
            labels: timefmt::WEEKDAY_LABELS.iter().map(|s| s.to_string()).collect(),
            temperatures,
            humidities,
        })
    }

    /// Every reading taken on one calendar day, at full time-of-day
    /// resolution (no averaging), ascending by time.
    pub fn readings_for_date(
        &self,
        day: u8,
        month: u8,
        year: i32,
        cfg: &AppConfig,
    ) -> Result<Vec<TimedReading>> {
        let date = timefmt::format_day(year, month, day, &cfg.dateformat)?;

        let mut stmt = self.conn.prepare(
            "SELECT timestamp_time, temperature, humidity
             FROM sensor_data
             WHERE timestamp_date = ?1
             ORDER BY timestamp_time",
        )?;

        let readings = stmt
            .query_map([&date], |row| {
                Ok(TimedReading {
                    time: row.get(0)?,
                    temperature: row.get(1)?,
                    humidity: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    /// Per-date averages over an inclusive date range.
    ///
    /// Both bounds must parse under the configured dateformat; they are
    /// re-emitted canonically before binding so equivalent spellings
    /// compare correctly.
    pub fn readings_for_range(
        &self,
        start: &str,
        end: &str,
        cfg: &AppConfig,
    ) -> Result<Vec<DailyReading>> {
        let start = timefmt::reformat_or_now(Some(start), &cfg.dateformat, &cfg.dateformat)?;
        let end = timefmt::reformat_or_now(Some(end), &cfg.dateformat, &cfg.dateformat)?;
        self.averaged_between(&start, &end)
    }

    /// First and last stored dates, or "now" twice when the store is
    /// empty.
    pub fn date_range(&self, cfg: &AppConfig) -> Result<DateRange> {
        self.range_with_format(&cfg.dateformat, cfg)
    }

    /// The stored date extent reformatted to ISO week labels.
    pub fn week_range(&self, cfg: &AppConfig) -> Result<DateRange> {
        self.range_with_format(&cfg.weekformat, cfg)
    }

    /// The stored date extent reformatted to month labels.
    pub fn month_range(&self, cfg: &AppConfig) -> Result<DateRange> {
        self.range_with_format(&cfg.monthformat, cfg)
    }

    /// Whole-table statistics in a single pass: row count, both
    /// averages, and the four extrema with the date each was first
    /// recorded on (earliest date wins a tie).
    pub fn statistics(&self) -> Result<Statistics> {
        let row = self.conn.query_row(
            "SELECT
                COUNT(*),
                AVG(temperature),
                AVG(humidity),
                MIN(temperature),
                (SELECT MIN(timestamp_date) FROM sensor_data
                  WHERE temperature = (SELECT MIN(temperature) FROM sensor_data)),
                MAX(temperature),
                (SELECT MIN(timestamp_date) FROM sensor_data
                  WHERE temperature = (SELECT MAX(temperature) FROM sensor_data)),
                MIN(humidity),
                (SELECT MIN(timestamp_date) FROM sensor_data
                  WHERE humidity = (SELECT MIN(humidity) FROM sensor_data)),
                MAX(humidity),
                (SELECT MIN(timestamp_date) FROM sensor_data
                  WHERE humidity = (SELECT MAX(humidity) FROM sensor_data))
             FROM sensor_data",
            [],
            |row| {
                let total: i64 = row.get(0)?;
                if total == 0 {
                    return Ok(None);
                }
                Ok(Some(Statistics {
                    total_entries: total as u64,
                    avg_temperature: row.get(1)?,
                    avg_humidity: row.get(2)?,
                    min_temperature: ValueDatePair {
                        value: row.get(3)?,
                        date: row.get(4)?,
                    },
                    max_temperature: ValueDatePair {
                        value: row.get(5)?,
                        date: row.get(6)?,
                    },
                    min_humidity: ValueDatePair {
                        value: row.get(7)?,
                        date: row.get(8)?,
                    },
                    max_humidity: ValueDatePair {
                        value: row.get(9)?,
                        date: row.get(10)?,
                    },
                }))
            },
        )?;

        row.ok_or(Error::NoData)
    }

    fn averaged_between(&self, start: &str, end: &str) -> Result<Vec<DailyReading>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp_date, AVG(temperature), AVG(humidity)
             FROM sensor_data
             WHERE timestamp_date BETWEEN ?1 AND ?2
             GROUP BY timestamp_date
             ORDER BY timestamp_date",
        )?;

        let readings = stmt
            .query_map([start, end], daily_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(readings)
    }

    fn range_with_format(&self, target: &str, cfg: &AppConfig) -> Result<DateRange> {
        let (min, max): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(timestamp_date), MAX(timestamp_date) FROM sensor_data",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DateRange {
            first: timefmt::reformat_or_now(min.as_deref(), &cfg.dateformat, target)?,
            last: timefmt::reformat_or_now(max.as_deref(), &cfg.dateformat, target)?,
        })
    }
}

fn daily_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<DailyReading, rusqlite::Error> {
    Ok(DailyReading {
        date: row.get(0)?,
        temperature: row.get(1)?,
        humidity: row.get(2)?,
    })
}

// Log operations
impl Store {
    /// Append a log entry. Timestamps are free text; duplicates are
    /// allowed.
    pub fn append_log(&self, message: &str, timestamp: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO logs (message, timestamp) VALUES (?1, ?2)",
            rusqlite::params![message, timestamp],
        )?;
        Ok(())
    }

    /// All log entries, ascending by timestamp.
    pub fn all_logs(&self) -> Result<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT message, timestamp FROM logs ORDER BY timestamp",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(LogEntry {
                    message: row.get(0)?,
                    timestamp: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Delete every log entry with an exact timestamp match. Returns
    /// the number of rows removed; 0 is a valid result, not an error.
    pub fn delete_logs_by_timestamp(&self, timestamp: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM logs WHERE timestamp = ?1", [timestamp])?;
        debug!("deleted {} log entries for timestamp {}", deleted, timestamp);
        Ok(deleted)
    }

    /// Delete the whole log table. Returns the number of rows removed.
    pub fn delete_all_logs(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM logs", [])?;
        info!("cleared log table ({} entries)", deleted);
        Ok(deleted)
    }
}

// Configuration row operations
impl Store {
    /// Insert the default configuration row if none exists yet.
    /// Safe to call every boot.
    pub fn seed_config(&self) -> Result<()> {
        let defaults = AppConfig::default();
        self.conn.execute(
            "INSERT OR IGNORE INTO config (
                id, sensor_interval, dateformat, timeformat,
                weekformat, monthformat, iso_week_format, use_sensor
             ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                defaults.sensor_interval,
                defaults.dateformat,
                defaults.timeformat,
                defaults.weekformat,
                defaults.monthformat,
                defaults.iso_week_format,
                defaults.use_sensor,
            ],
        )?;
        Ok(())
    }

    /// Load the singleton configuration row.
    ///
    /// A missing row after seeding is a boot-time invariant violation,
    /// reported as [`Error::ConfigurationUnavailable`].
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut stmt = self.conn.prepare(
            "SELECT sensor_interval, dateformat, timeformat, weekformat,
                    monthformat, iso_week_format, use_sensor
             FROM config WHERE id = 1",
        )?;

        let mut rows = stmt.query_map([], |row| {
            Ok(AppConfig {
                sensor_interval: row.get::<_, i64>(0)?.max(0) as u64,
                dateformat: row.get(1)?,
                timeformat: row.get(2)?,
                weekformat: row.get(3)?,
                monthformat: row.get(4)?,
                iso_week_format: row.get(5)?,
                use_sensor: row.get(6)?,
            })
        })?;

        match rows.next() {
            Some(cfg) => Ok(cfg?),
            None => Err(Error::ConfigurationUnavailable),
        }
    }

    /// Persist a full new configuration over the singleton row.
    pub fn save_config(&self, cfg: &AppConfig) -> Result<()> {
        self.conn.execute(
            "UPDATE config SET
                sensor_interval = ?1,
                dateformat = ?2,
                timeformat = ?3,
                weekformat = ?4,
                monthformat = ?5,
                iso_week_format = ?6,
                use_sensor = ?7
             WHERE id = 1",
            rusqlite::params![
                cfg.sensor_interval,
                cfg.dateformat,
                cfg.timeformat,
                cfg.weekformat,
                cfg.monthformat,
                cfg.iso_week_format,
                cfg.use_sensor,
            ],
        )?;
        info!("configuration row updated");
        Ok(())
    }
}
