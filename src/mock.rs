//! Demo data for the overseer console and schema lab.
//!
//! Nothing here talks to monk. Panels that have no live source (system
//! health, population, alerts, activity) are filled from this generator, and
//! the schema lab falls back to it when `meta select` is unavailable.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

const PERSONNEL: &[&str] = &[
    "LONE_WANDERER",
    "THREE_DOG",
    "SARAH_LYONS",
    "ELDER_LYONS",
    "KNIGHT_CAPTAIN",
    "PALADIN_CROSS",
    "FAWKES",
    "CHARON",
    "DOGMEAT",
    "BUTCH_DELORIA",
    "AMATA",
    "JAMES_FATHER",
    "MR_BURKE",
    "LUCAS_SIMMS",
    "NOVA",
    "GRETA",
];

const SECTIONS: &[&str] = &[
    "OVERSEER",
    "SECURITY",
    "MEDICAL",
    "ENGINEERING",
    "MAINTENANCE",
    "RESEARCH",
    "COMMUNICATIONS",
    "HYDROPONICS",
    "ARCHIVES",
    "RECREATION",
    "QUARTERS",
    "STORAGE",
];

/// Schema names shown in the registry.
pub const SCHEMA_NAMES: &[&str] = &[
    "personnel_records",
    "security_clearance",
    "inventory_management",
    "medical_records",
    "facility_maintenance",
    "research_data",
    "communication_logs",
    "supply_requisitions",
    "incident_reports",
    "vault_operations",
    "environmental_data",
    "power_systems",
];

const ACTIVITY_TYPES: &[(&str, &[&str])] = &[
    ("PERSONNEL", &["CREATE", "UPDATE", "DELETE", "TRANSFER"]),
    ("SECURITY", &["UPDATE", "VERIFY", "RESTRICT", "GRANT"]),
    ("INVENTORY", &["CREATE", "UPDATE", "DELETE", "AUDIT"]),
    ("SCHEMA", &["DEPLOY", "UPDATE", "VALIDATE", "ROLLBACK"]),
    ("OBSERVER", &["INFO", "WARNING", "ERROR", "RECOVERY"]),
    ("SYSTEM", &["BACKUP", "MAINTENANCE", "UPGRADE", "MONITOR"]),
];

const ITEMS: &[&str] = &["STIMPAK", "RAD-AWAY", "PLASMA_RIFLE", "POWER_ARMOR", "NUKA_COLA"];

/// Health of one vault subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    Warning,
    Error,
}

impl Health {
    const ALL: [Health; 3] = [Health::Ok, Health::Warning, Health::Error];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub database: Health,
    pub api: Health,
    pub observers: Health,
    pub security: Health,
}

impl SystemStatus {
    /// Rows in display order.
    pub fn entries(&self) -> [(&'static str, Health); 4] {
        [
            ("DATABASE", self.database),
            ("API", self.api),
            ("OBSERVERS", self.observers),
            ("SECURITY", self.security),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationStats {
    pub total: u32,
    pub active: u32,
    pub offline: u32,
    /// `HH:MM:SS`
    pub last_update: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: &'static str,
    pub level: AlertLevel,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// `HH:MM:SS`
    pub timestamp: String,
    pub module: &'static str,
    pub action: &'static str,
    pub description: String,
    pub user: String,
}

/// Lifecycle state of a schema in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    Deployed,
    Testing,
    Draft,
}

impl SchemaStatus {
    const ALL: [SchemaStatus; 3] = [Self::Deployed, Self::Testing, Self::Draft];
    const WEIGHTS: [u32; 3] = [60, 25, 15];

    pub fn label(self) -> &'static str {
        match self {
            Self::Deployed => "● DEPLOYED",
            Self::Testing => "⚠ TESTING",
            Self::Draft => "○ DRAFT",
        }
    }

    /// Killbox hints shown in the actions column.
    pub fn actions(self) -> &'static str {
        match self {
            Self::Deployed => "[E][D]",
            Self::Testing => "[E][T]",
            Self::Draft => "[E][X]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRow {
    pub name: String,
    pub version: String,
    pub status: SchemaStatus,
    pub record_count: u32,
    pub last_modified: NaiveDate,
}

impl SchemaRow {
    /// Record count with thousands separators.
    pub fn records(&self) -> String {
        with_thousands(self.record_count)
    }
}

/// Everything the overseer console shows from demo data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardData {
    pub system_status: SystemStatus,
    pub population: PopulationStats,
    pub alerts: Vec<Alert>,
    pub recent_activity: Vec<Activity>,
}

/// Generator for demo vault data.
#[derive(Debug, Clone)]
pub struct VaultDataGenerator {
    rng: StdRng,
    start_time: NaiveDateTime,
}

impl Default for VaultDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultDataGenerator {
    /// Entropy-seeded generator whose activity window ends now.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), Local::now().naive_local())
    }

    /// Deterministic generator for tests and headless runs.
    pub fn seeded(seed: u64, now: NaiveDateTime) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), now)
    }

    fn with_rng(rng: StdRng, now: NaiveDateTime) -> Self {
        Self {
            rng,
            start_time: now - Duration::hours(8),
        }
    }

    fn weighted_health(&mut self, weights: [u32; 3]) -> Health {
        pick_weighted(&mut self.rng, &Health::ALL, &weights)
    }

    pub fn system_status(&mut self) -> SystemStatus {
        SystemStatus {
            database: self.weighted_health([80, 15, 5]),
            api: self.weighted_health([90, 8, 2]),
            observers: self.weighted_health([85, 12, 3]),
            security: self.weighted_health([95, 4, 1]),
        }
    }

    pub fn population_stats(&mut self, now: NaiveDateTime) -> PopulationStats {
        let total = self.rng.gen_range(2800..=3200);
        let offline = self.rng.gen_range(10..=50);
        PopulationStats {
            total,
            active: total - offline,
            offline,
            last_update: now.format("%H:%M:%S").to_string(),
        }
    }

    pub fn alerts(&mut self, now: NaiveDateTime) -> Vec<Alert> {
        let timestamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();
        let mut alerts = Vec::new();

        if self.rng.gen_bool(0.3) {
            alerts.push(Alert {
                kind: "schema",
                level: AlertLevel::Warning,
                message: "Schema validation performance degraded",
                timestamp: timestamp.clone(),
            });
        }
        if self.rng.gen_bool(0.05) {
            alerts.push(Alert {
                kind: "system",
                level: AlertLevel::Critical,
                message: "Database connection pool exhausted",
                timestamp: timestamp.clone(),
            });
        }
        if self.rng.gen_bool(0.4) {
            alerts.push(Alert {
                kind: "observer",
                level: AlertLevel::Info,
                message: "Observer pipeline processing normally",
                timestamp,
            });
        }

        alerts
    }

    /// `count` activity entries from the last eight hours, newest first.
    pub fn recent_activity(&mut self, count: usize, user: &str) -> Vec<Activity> {
        let mut activities: Vec<Activity> = (0..count)
            .map(|_| {
                let (module, actions) = pick(&mut self.rng, ACTIVITY_TYPES);
                let action = pick(&mut self.rng, actions);
                let at = self.start_time
                    + Duration::minutes(self.rng.gen_range(0..=480))
                    + Duration::seconds(self.rng.gen_range(0..=59));
                Activity {
                    timestamp: at.format("%H:%M:%S").to_string(),
                    module,
                    action,
                    description: self.describe(module, action),
                    user: user.to_string(),
                }
            })
            .collect();

        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        activities
    }

    /// One fresh activity entry three times in ten, for live log updates.
    pub fn occasional_activity(&mut self, user: &str) -> Option<Activity> {
        if self.rng.gen_ratio(3, 10) {
            self.recent_activity(1, user).pop()
        } else {
            None
        }
    }

    fn describe(&mut self, module: &str, action: &str) -> String {
        match (module, action) {
            ("PERSONNEL", "CREATE") => format!("New resident: {}", pick(&mut self.rng, PERSONNEL)),
            ("PERSONNEL", "UPDATE") => "Security clearance modified".to_string(),
            ("PERSONNEL", "DELETE") => "Resident record archived".to_string(),
            ("PERSONNEL", _) => format!("Transfer to {} section", pick(&mut self.rng, SECTIONS)),
            ("SECURITY", "UPDATE") => "Access level modified".to_string(),
            ("SECURITY", "VERIFY") => "Biometric scan completed".to_string(),
            ("SECURITY", other) => format!("Clearance {}ed", other.to_lowercase()),
            ("INVENTORY", verb) => {
                let item = pick(&mut self.rng, ITEMS);
                match verb {
                    "CREATE" => format!("Equipment added: {item}"),
                    "DELETE" => format!("Equipment decommissioned: {item}"),
                    other => format!("Inventory {}: {item}", other.to_lowercase()),
                }
            }
            ("SCHEMA", _) => {
                let schema = pick(&mut self.rng, SCHEMA_NAMES);
                let version = format!(
                    "v{}.{}.{}",
                    self.rng.gen_range(1..=3),
                    self.rng.gen_range(0..=5),
                    self.rng.gen_range(0..=10)
                );
                format!("{schema} {version}")
            }
            ("OBSERVER", "INFO") => "All security rings active".to_string(),
            ("OBSERVER", "WARNING") => "Performance threshold exceeded".to_string(),
            ("OBSERVER", other) => format!("Observer ring {}", other.to_lowercase()),
            (_, "BACKUP") => "System backup completed".to_string(),
            (_, "MAINTENANCE") => "Scheduled maintenance performed".to_string(),
            (_, "UPGRADE") => "Component upgrade installed".to_string(),
            (_, "MONITOR") => "Health check completed".to_string(),
            (_, other) => format!("System {}", other.to_lowercase()),
        }
    }

    /// Registry rows for every known schema, most records first.
    pub fn schema_registry(&mut self) -> Vec<SchemaRow> {
        let mut rows: Vec<SchemaRow> = SCHEMA_NAMES
            .iter()
            .map(|name| {
                let status =
                    pick_weighted(&mut self.rng, &SchemaStatus::ALL, &SchemaStatus::WEIGHTS);
                let version = format!(
                    "v{}.{}.{}",
                    self.rng.gen_range(1..=3),
                    self.rng.gen_range(0..=5),
                    self.rng.gen_range(0..=15)
                );
                let record_count = match status {
                    SchemaStatus::Deployed => self.rng.gen_range(100..=50_000),
                    SchemaStatus::Testing => self.rng.gen_range(10..=5_000),
                    SchemaStatus::Draft => 0,
                };
                let last_modified =
                    (self.start_time + Duration::days(self.rng.gen_range(0..=30))).date();
                SchemaRow {
                    name: name.to_string(),
                    version,
                    status,
                    record_count,
                    last_modified,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.record_count.cmp(&a.record_count));
        rows
    }

    /// Status, population, alerts and ten activity entries.
    pub fn dashboard(&mut self, now: NaiveDateTime, user: &str) -> DashboardData {
        DashboardData {
            system_status: self.system_status(),
            population: self.population_stats(now),
            alerts: self.alerts(now),
            recent_activity: self.recent_activity(10, user),
        }
    }
}

fn pick<T: Copy>(rng: &mut StdRng, items: &[T]) -> T {
    // Every caller passes a non-empty constant table.
    *items.choose(rng).unwrap_or(&items[0])
}

fn pick_weighted<T: Copy>(rng: &mut StdRng, items: &[T], weights: &[u32]) -> T {
    match WeightedIndex::new(weights) {
        Ok(dist) => items[dist.sample(rng)],
        Err(_) => items[0],
    }
}

/// Formats `n` with comma thousands separators.
pub fn with_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
