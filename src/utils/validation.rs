use anyhow::{anyhow, Result};

/// Upper bound on images attached to a single rental object.
pub const MAX_IMAGES_PER_OBJECT: usize = 10;

pub fn validate_location_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Location name cannot be empty"));
    }

    if name.chars().count() > 255 {
        return Err(anyhow!("Location name cannot be longer than 255 characters"));
    }

    Ok(())
}

pub fn validate_capacity(capacity: u32) -> Result<()> {
    if capacity == 0 {
        return Err(anyhow!("Capacity must be at least 1"));
    }

    Ok(())
}

pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(anyhow!("Latitude {} is out of range", lat));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(anyhow!("Longitude {} is out of range", lon));
            }
            Ok(())
        }
        _ => Err(anyhow!("Latitude and longitude must be set together")),
    }
}

pub fn validate_rental_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Rental object name cannot be empty"));
    }

    if name.chars().count() > 255 {
        return Err(anyhow!("Rental object name cannot be longer than 255 characters"));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Rental object name cannot contain line breaks"));
    }

    Ok(())
}

pub fn validate_price_per_day(price: i64) -> Result<()> {
    if price <= 0 {
        return Err(anyhow!("Price per day must be greater than zero"));
    }

    Ok(())
}

pub fn validate_min_duration(days: u32) -> Result<()> {
    if days == 0 {
        return Err(anyhow!("Minimum rental duration must be at least one day"));
    }

    Ok(())
}

pub fn validate_image_count(count: usize) -> Result<()> {
    if count > MAX_IMAGES_PER_OBJECT {
        return Err(anyhow!(
            "Cannot attach more than {} images, got {}",
            MAX_IMAGES_PER_OBJECT,
            count
        ));
    }

    Ok(())
}

pub fn validate_image_url(url: &str) -> Result<()> {
    let url = url.trim();

    if url.is_empty() {
        return Err(anyhow!("Image URL cannot be empty"));
    }

    if url.chars().any(char::is_whitespace) {
        return Err(anyhow!("Image URL cannot contain whitespace"));
    }

    Ok(())
}

pub fn validate_telegram_user_id(user_id: i64) -> Result<()> {
    // User ids are always positive; negative ids belong to chats
    if user_id <= 0 {
        return Err(anyhow!("Telegram user ID must be positive"));
    }

    Ok(())
}

/// Checks a free-text profile field against its maximum length in characters.
pub fn validate_profile_field(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.chars().count() > max_len {
        return Err(anyhow!("{} cannot be longer than {} characters", field, max_len));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();

    if !(5..=32).contains(&len) {
        return Err(anyhow!("Username must be 5-32 characters long"));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(anyhow!("Username can only contain letters, numbers, and underscores"));
    }

    Ok(())
}

pub fn validate_language_code(code: &str) -> Result<()> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(anyhow!("Language code must be two lowercase letters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_location_name() {
        assert!(validate_location_name("Beach Station").is_ok());
        assert!(validate_location_name("  Trimmed  ").is_ok());
        assert!(validate_location_name("").is_err());
        assert!(validate_location_name("   ").is_err());
        assert!(validate_location_name(&"a".repeat(256)).is_err());
        assert!(validate_location_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(55.7558), Some(37.6173)).is_ok());
        assert!(validate_coordinates(Some(-90.0), Some(180.0)).is_ok());
        assert!(validate_coordinates(Some(90.1), Some(0.0)).is_err());
        assert!(validate_coordinates(Some(0.0), Some(-180.5)).is_err());
        assert!(validate_coordinates(Some(10.0), None).is_err());
    }

    #[test]
    fn test_validate_price_per_day() {
        assert!(validate_price_per_day(1).is_ok());
        assert!(validate_price_per_day(0).is_err());
        assert!(validate_price_per_day(-100).is_err());
    }

    #[test]
    fn test_validate_image_count() {
        assert!(validate_image_count(0).is_ok());
        assert!(validate_image_count(MAX_IMAGES_PER_OBJECT).is_ok());
        assert!(validate_image_count(MAX_IMAGES_PER_OBJECT + 1).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("testuser2").is_ok());
        assert!(validate_username("user_name_42").is_ok());
        assert!(validate_username("abcd").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("bad-name").is_err());
    }

    #[test]
    fn test_validate_language_code() {
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("ru").is_ok());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("eng").is_err());
        assert!(validate_language_code("").is_err());
    }

    #[test]
    fn test_validate_profile_field() {
        assert!(validate_profile_field("Bio", &"b".repeat(70), 70).is_ok());
        assert!(validate_profile_field("Bio", &"b".repeat(71), 70).is_err());
        assert!(validate_profile_field("First name", "Иван", 4).is_ok());
    }
}
