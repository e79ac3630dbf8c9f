use serde::{Deserialize, Serialize};
use std::fmt;

/// Base equipment categories accepted in an upload.
///
/// `HeatExchangerLegacy` is the unspaced `HeatExchanger` spelling found in older
/// exports. It is kept as its own label so stored records round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentType {
    #[serde(rename = "Reactor")]
    Reactor,
    #[serde(rename = "Pump")]
    Pump,
    #[serde(rename = "Heat Exchanger")]
    HeatExchanger,
    #[serde(rename = "HeatExchanger")]
    HeatExchangerLegacy,
    #[serde(rename = "Compressor")]
    Compressor,
    #[serde(rename = "Valve")]
    Valve,
    #[serde(rename = "Condenser")]
    Condenser,
}

impl EquipmentType {
    /// Declaration order; also the tie-break order for prefix matching.
    pub const ALL: [EquipmentType; 7] = [
        EquipmentType::Reactor,
        EquipmentType::Pump,
        EquipmentType::HeatExchanger,
        EquipmentType::HeatExchangerLegacy,
        EquipmentType::Compressor,
        EquipmentType::Valve,
        EquipmentType::Condenser,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentType::Reactor => "Reactor",
            EquipmentType::Pump => "Pump",
            EquipmentType::HeatExchanger => "Heat Exchanger",
            EquipmentType::HeatExchangerLegacy => "HeatExchanger",
            EquipmentType::Compressor => "Compressor",
            EquipmentType::Valve => "Valve",
            EquipmentType::Condenser => "Condenser",
        }
    }

    pub fn from_label(label: &str) -> Option<EquipmentType> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// Resolve a raw `Type` cell such as `Pump-A2` to its base type.
    ///
    /// The longest label that prefixes `raw` wins. Labels of equal length keep
    /// declaration order.
    pub fn normalize(raw: &str) -> Option<EquipmentType> {
        let mut best: Option<EquipmentType> = None;
        for candidate in Self::ALL {
            if !raw.starts_with(candidate.label()) {
                continue;
            }
            match best {
                Some(current) if current.label().len() >= candidate.label().len() => {}
                _ => best = Some(candidate),
            }
        }
        best
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated row, ready to be persisted under a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipmentRecord {
    pub equipment_name: String,
    pub equipment_type: EquipmentType,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: i64,
    pub dataset_id: i64,
    pub equipment_name: String,
    #[serde(rename = "type")]
    pub equipment_type: EquipmentType,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
