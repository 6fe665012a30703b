use std::{fmt, str::FromStr};

/// Ministries, agencies and commissions (MACs) and their short codes.
///
/// Short codes are two to four uppercase letters. Names are unique.
pub const MACS: &[(&str, &str)] = &[
    ("Ministry of Health", "MOH"),
    ("Ministry of Education", "MOE"),
    ("Ministry of Finance", "MOF"),
    ("Ministry of Agriculture", "MOA"),
    ("Ministry of Public Works", "MPW"),
    ("Ministry of Justice", "MOJ"),
    ("Ministry of Foreign Affairs", "MFA"),
    ("Environmental Protection Agency", "EPA"),
    ("Civil Service Agency", "CSA"),
    ("National Elections Commission", "NEC"),
];

/// Vehicle classes and their two-digit codes.
pub const VEHICLE_CLASSES: &[(&str, &str)] = &[
    ("Motorcycle", "01"),
    ("Sedan", "02"),
    ("SUV", "03"),
    ("Pickup", "04"),
    ("Van", "05"),
    ("Bus", "06"),
    ("Truck", "07"),
];

/// Free-form vehicle type tokens, lowercased, mapped onto vehicle class codes.
const VEHICLE_TYPE_TOKENS: &[(&str, &str)] = &[
    ("motorcycle", "01"),
    ("motorbike", "01"),
    ("bike", "01"),
    ("sedan", "02"),
    ("car", "02"),
    ("saloon", "02"),
    ("suv", "03"),
    ("jeep", "03"),
    ("4x4", "03"),
    ("pickup", "04"),
    ("pick-up", "04"),
    ("pickup truck", "04"),
    ("van", "05"),
    ("minivan", "05"),
    ("bus", "06"),
    ("minibus", "06"),
    ("coaster", "06"),
    ("truck", "07"),
    ("lorry", "07"),
];

/// Equipment classes and their two-digit codes.
pub const EQUIPMENT_CLASSES: &[(&str, &str)] = &[
    ("Computer", "01"),
    ("Laptop", "02"),
    ("Printer", "03"),
    ("Photocopier", "04"),
    ("Projector", "05"),
    ("Generator", "06"),
    ("Air Conditioner", "07"),
    ("Network Equipment", "08"),
    ("Medical Equipment", "09"),
    ("Other Equipment", "10"),
];

/// Furniture classes and their two-digit codes.
pub const FURNITURE_CLASSES: &[(&str, &str)] = &[
    ("Desk", "01"),
    ("Office Chair", "02"),
    ("Conference Table", "03"),
    ("Filing Cabinet", "04"),
    ("Bookshelf", "05"),
    ("Sofa", "06"),
    ("Cupboard", "07"),
    ("Bench", "08"),
    ("Bed", "09"),
    ("Other Furniture", "10"),
];

const DEFAULT_VEHICLE_CLASS: &str = "02";
const DEFAULT_EQUIPMENT_CLASS: &str = "10";
const DEFAULT_FURNITURE_CLASS: &str = "10";

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find_map(|&(name, code)| (name == key).then_some(code))
}

/// Returns the short code for a MAC name, or an empty string if the name is
/// not in the catalogue.
///
/// An empty code means "no code available"; callers must not build a GSA code
/// from it without surfacing the problem to the operator.
#[must_use]
pub fn mac_code_for(mac_name: &str) -> &'static str {
    lookup(MACS, mac_name).unwrap_or_else(|| {
        tracing::debug!("Unrecognised MAC name '{mac_name}'");
        ""
    })
}

/// Returns the MAC name for a short code, if the code is in the catalogue.
#[must_use]
pub fn mac_name_for(mac_code: &str) -> Option<&'static str> {
    MACS.iter()
        .find_map(|&(name, code)| (code == mac_code).then_some(name))
}

/// Normalises a free-form vehicle type ("car", "SUV", "Pickup Truck", ...)
/// to a vehicle class code.
///
/// Matching is case-insensitive. Unrecognised tokens fall back to the Sedan
/// code (`"02"`).
#[must_use]
pub fn vehicle_class_code_for(vehicle_type: &str) -> &'static str {
    let token = vehicle_type.trim().to_lowercase();
    lookup(VEHICLE_TYPE_TOKENS, &token).unwrap_or(DEFAULT_VEHICLE_CLASS)
}

/// Returns the class code for an equipment class name, falling back to
/// `"10"` (Other Equipment).
#[must_use]
pub fn equipment_class_code_for(class_name: &str) -> &'static str {
    lookup(EQUIPMENT_CLASSES, class_name).unwrap_or(DEFAULT_EQUIPMENT_CLASS)
}

/// Returns the class code for a furniture class name, falling back to `"10"`
/// (Other Furniture).
#[must_use]
pub fn furniture_class_code_for(class_name: &str) -> &'static str {
    lookup(FURNITURE_CLASSES, class_name).unwrap_or(DEFAULT_FURNITURE_CLASS)
}

/// The kind of asset being coded.
///
/// Each category has its own class table and its own registry collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetCategory {
    /// Fleet vehicles.
    Vehicle,
    /// Office, IT and medical equipment.
    Equipment,
    /// Office furniture.
    Furniture,
}

impl AssetCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 3] = [Self::Vehicle, Self::Equipment, Self::Furniture];

    /// The singular name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Equipment => "equipment",
            Self::Furniture => "furniture",
        }
    }

    /// The name of the collection holding assets of this category.
    ///
    /// This is both the JSON envelope key and the collection file stem.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicles",
            Self::Equipment => "equipment",
            Self::Furniture => "furniture",
        }
    }

    /// The class table for this category.
    #[must_use]
    pub const fn classes(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Vehicle => VEHICLE_CLASSES,
            Self::Equipment => EQUIPMENT_CLASSES,
            Self::Furniture => FURNITURE_CLASSES,
        }
    }

    /// Resolves a class label to a class code using this category's rules.
    #[must_use]
    pub fn class_code_for(self, class_label: &str) -> &'static str {
        match self {
            Self::Vehicle => vehicle_class_code_for(class_label),
            Self::Equipment => equipment_class_code_for(class_label),
            Self::Furniture => furniture_class_code_for(class_label),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name an asset category.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown asset category '{0}': expected vehicle, equipment or furniture")]
pub struct UnknownCategoryError(String);

impl FromStr for AssetCategory {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| lowered == category.as_str() || lowered == category.collection())
            .ok_or_else(|| UnknownCategoryError(s.to_string()))
    }
}
