//! Bundled clinic data for the Melbourne inner suburbs
//!
//! These records are compiled into the binary and serve two roles: the
//! payload of the bundled directory source, and the last-resort fallback
//! when no usable cache exists.

use super::{Coordinates, DirectoryRecord};

/// Version of the bundled dataset. Bump whenever the table below changes.
pub const BUNDLED_DATASET_VERSION: u32 = 1;

struct BundledClinic {
    id: u32,
    name: &'static str,
    suburb: &'static str,
    address: &'static str,
    services: &'static [&'static str],
    rating: f64,
    lat: f64,
    lng: f64,
}

static CLINICS: [BundledClinic; 6] = [
    BundledClinic {
        id: 1,
        name: "Melbourne Community Health Centre",
        suburb: "Melbourne",
        address: "109 Collins Street, Melbourne VIC 3000",
        services: &["General Practice", "Mental Health", "Dental"],
        rating: 4.5,
        lat: -37.8136,
        lng: 144.9631,
    },
    BundledClinic {
        id: 2,
        name: "Richmond Family Clinic",
        suburb: "Richmond",
        address: "400 Swan Street, Richmond VIC 3121",
        services: &["General Practice", "Pharmacy", "Women's Health"],
        rating: 4.2,
        lat: -37.8267,
        lng: 144.9941,
    },
    BundledClinic {
        id: 3,
        name: "Fitzroy Health Hub",
        suburb: "Fitzroy",
        address: "10 Brunswick Street, Fitzroy VIC 3065",
        services: &["General Practice", "Mental Health", "Specialist Care"],
        rating: 4.7,
        lat: -37.7982,
        lng: 144.9784,
    },
    BundledClinic {
        id: 4,
        name: "St Kilda Community Clinic",
        suburb: "St Kilda",
        address: "71 Acland Street, St Kilda VIC 3182",
        services: &["General Practice", "Dental", "Pharmacy"],
        rating: 4.3,
        lat: -37.8653,
        lng: 144.9742,
    },
    BundledClinic {
        id: 5,
        name: "Brunswick Medical Centre",
        suburb: "Brunswick",
        address: "23 Sydney Road, Brunswick VIC 3056",
        services: &["General Practice", "Mental Health", "Youth Services"],
        rating: 4.1,
        lat: -37.7694,
        lng: 144.9581,
    },
    BundledClinic {
        id: 6,
        name: "Collingwood Family Health",
        suburb: "Collingwood",
        address: "50 Smith Street, Collingwood VIC 3066",
        services: &["General Practice", "Women's Health", "Dental"],
        rating: 4.4,
        lat: -37.805,
        lng: 144.9889,
    },
];

impl BundledClinic {
    fn to_record(&self) -> DirectoryRecord {
        DirectoryRecord {
            id: self.id,
            name: self.name.to_string(),
            suburb: self.suburb.to_string(),
            address: self.address.to_string(),
            services: self.services.iter().map(|s| s.to_string()).collect(),
            rating: self.rating,
            coordinates: Coordinates {
                lat: self.lat,
                lng: self.lng,
            },
        }
    }
}

/// Returns a fresh copy of the bundled clinic records
///
/// # Example
///
/// ```
/// use zestwell::data::default_records;
///
/// for clinic in default_records() {
///     println!("{} ({})", clinic.name, clinic.suburb);
/// }
/// ```
pub fn default_records() -> Vec<DirectoryRecord> {
    CLINICS.iter().map(BundledClinic::to_record).collect()
}
