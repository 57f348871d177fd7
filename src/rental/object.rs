use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, RentalResult};
use crate::utils::validation::{
    validate_image_count, validate_image_url, validate_min_duration, validate_price_per_day,
    validate_rental_name, MAX_IMAGES_PER_OBJECT,
};

/// Category of a rentable item or service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalKind {
    Car,
    Equipment,
    Kite,
    Moto,
    Spa,
    Property,
    Wakeboard,
    Other,
}

impl RentalKind {
    pub const ALL: [RentalKind; 8] = [
        RentalKind::Car,
        RentalKind::Equipment,
        RentalKind::Kite,
        RentalKind::Moto,
        RentalKind::Spa,
        RentalKind::Property,
        RentalKind::Wakeboard,
        RentalKind::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RentalKind::Car => "car",
            RentalKind::Equipment => "equipment",
            RentalKind::Kite => "kite",
            RentalKind::Moto => "moto",
            RentalKind::Spa => "spa",
            RentalKind::Property => "property",
            RentalKind::Wakeboard => "wakeboard",
            RentalKind::Other => "other",
        }
    }
}

impl fmt::Display for RentalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalKind {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RentalKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RentalError::validation(format!("Unknown rental kind '{}'", s)))
    }
}

/// Image reference; files live in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalImage {
    pub id: Option<i64>,
    pub url: String,
}

impl RentalImage {
    pub fn new(url: impl Into<String>) -> RentalResult<Self> {
        let url = url.into();
        validate_image_url(&url).map_err(|e| RentalError::validation(e.to_string()))?;
        Ok(Self {
            id: None,
            url: url.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRentalObject {
    pub name: String,
    pub kind: RentalKind,
    pub min_duration_days: u32,
    /// Minor currency units.
    pub price_per_day: i64,
    pub is_available: bool,
    pub locations: Vec<i64>,
    pub images: Vec<String>,
}

impl NewRentalObject {
    pub fn new(name: impl Into<String>, kind: RentalKind, price_per_day: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            min_duration_days: 1,
            price_per_day,
            is_available: true,
            locations: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn validate(&self) -> RentalResult<()> {
        validate_rental_name(&self.name).map_err(|e| RentalError::validation(e.to_string()))?;
        validate_price_per_day(self.price_per_day).map_err(|e| RentalError::validation(e.to_string()))?;
        validate_min_duration(self.min_duration_days)
            .map_err(|e| RentalError::validation(e.to_string()))?;
        validate_image_count(self.images.len()).map_err(|e| RentalError::validation(e.to_string()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalObject {
    pub id: Option<i64>,
    pub name: String,
    pub kind: RentalKind,
    pub min_duration_days: u32,
    pub price_per_day: i64,
    pub is_available: bool,
    pub locations: Vec<i64>,
    images: Vec<RentalImage>,
}

impl RentalObject {
    /// Validates every field, images included, before building the object.
    pub fn new(fields: NewRentalObject) -> RentalResult<Self> {
        fields.validate()?;

        let images = fields
            .images
            .into_iter()
            .map(RentalImage::new)
            .collect::<RentalResult<Vec<_>>>()?;

        let mut locations = fields.locations;
        locations.sort_unstable();
        locations.dedup();

        Ok(Self {
            id: None,
            name: fields.name.trim().to_string(),
            kind: fields.kind,
            min_duration_days: fields.min_duration_days,
            price_per_day: fields.price_per_day,
            is_available: fields.is_available,
            locations,
            images,
        })
    }

    /// Rebuilds a stored object without re-running creation checks.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: i64,
        name: String,
        kind: RentalKind,
        min_duration_days: u32,
        price_per_day: i64,
        is_available: bool,
        locations: Vec<i64>,
        images: Vec<RentalImage>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            kind,
            min_duration_days,
            price_per_day,
            is_available,
            locations,
            images,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn images(&self) -> &[RentalImage] {
        &self.images
    }

    /// Appends an image, refusing once the object holds the maximum.
    pub fn add_image(&mut self, image: RentalImage) -> RentalResult<()> {
        if self.images.len() >= MAX_IMAGES_PER_OBJECT {
            return Err(RentalError::validation(format!(
                "{} already has {} images",
                self.name, MAX_IMAGES_PER_OBJECT
            )));
        }
        self.images.push(image);
        Ok(())
    }

    pub fn remove_image(&mut self, position: usize) -> Option<RentalImage> {
        (position < self.images.len()).then(|| self.images.remove(position))
    }

    pub fn check_duration(&self, days: i64) -> RentalResult<()> {
        if days < i64::from(self.min_duration_days) {
            return Err(RentalError::validation(format!(
                "{} must be rented for at least {} day(s), requested {}",
                self.name, self.min_duration_days, days
            )));
        }
        Ok(())
    }

    /// Total for `days` days; a total that does not fit in `i64` is rejected.
    pub fn price_for(&self, days: i64) -> RentalResult<i64> {
        self.price_per_day.checked_mul(days).ok_or_else(|| {
            RentalError::validation(format!(
                "Price of {} for {} day(s) is too large",
                self.name, days
            ))
        })
    }
}
