use rental_booking_bot::utils::validation::*;

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_rental_names() {
        let valid_names = vec![
            "Tesla Model 3".to_string(),
            "Mountain bike #4".to_string(),
            "Yacht \"Sea Breeze\"".to_string(),
            "X".to_string(),
            "A".repeat(255),
        ];

        for name in valid_names {
            assert!(validate_rental_name(&name).is_ok(), "Should accept name: {}", name);
        }
    }

    #[test]
    fn test_invalid_rental_names() {
        let invalid_names = vec![
            "".to_string(),
            "   ".to_string(),
            "A".repeat(256),
            "Two\nlines".to_string(),
        ];

        for name in invalid_names {
            assert!(validate_rental_name(&name).is_err(), "Should reject name: {:?}", name);
        }
    }

    #[test]
    fn test_price_must_be_positive() {
        assert!(validate_price_per_day(1).is_ok());
        assert!(validate_price_per_day(150_000).is_ok());
        assert!(validate_price_per_day(0).is_err());
        assert!(validate_price_per_day(-100).is_err());
    }

    #[test]
    fn test_image_count_limit() {
        assert!(validate_image_count(0).is_ok());
        assert!(validate_image_count(MAX_IMAGES_PER_OBJECT).is_ok());

        let error = validate_image_count(MAX_IMAGES_PER_OBJECT + 1).unwrap_err();
        assert!(error.to_string().contains("more than 10 images"));
    }

    #[test]
    fn test_image_urls() {
        assert!(validate_image_url("https://cdn.example.com/car.jpg").is_ok());
        assert!(validate_image_url("AgACAgIAAxkBAAIB").is_ok());
        assert!(validate_image_url("").is_err());
        assert!(validate_image_url("https://cdn.example.com/my car.jpg").is_err());
    }

    #[test]
    fn test_location_fields() {
        assert!(validate_location_name("Marina Point").is_ok());
        assert!(validate_location_name(" ").is_err());
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(0).is_err());
    }

    #[test]
    fn test_coordinates_come_in_pairs() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(55.75), Some(37.62)).is_ok());
        assert!(validate_coordinates(Some(55.75), None).is_err());
        assert!(validate_coordinates(None, Some(37.62)).is_err());
        assert!(validate_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(validate_coordinates(Some(0.0), Some(-180.5)).is_err());
    }

    #[test]
    fn test_min_duration() {
        assert!(validate_min_duration(1).is_ok());
        assert!(validate_min_duration(30).is_ok());
        assert!(validate_min_duration(0).is_err());
    }

    #[test]
    fn test_valid_user_ids() {
        let valid_ids = vec![1i64, 12345, 987654321, i64::MAX];

        for user_id in valid_ids {
            assert!(validate_telegram_user_id(user_id).is_ok(), "Should accept user ID: {}", user_id);
        }
    }

    #[test]
    fn test_invalid_user_ids() {
        let invalid_ids = vec![0i64, -1, -1001234567890];

        for user_id in invalid_ids {
            assert!(validate_telegram_user_id(user_id).is_err(), "Should reject user ID: {}", user_id);
        }
    }

    #[test]
    fn test_usernames() {
        assert!(validate_username("rental_fan").is_ok());
        assert!(validate_username("abcde").is_ok());
        assert!(validate_username("abcd").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("has-dash").is_err());
    }

    #[test]
    fn test_profile_fields_and_language() {
        assert!(validate_profile_field("Bio", &"b".repeat(70), 70).is_ok());
        assert!(validate_profile_field("Bio", &"b".repeat(71), 70).is_err());
        assert!(validate_language_code("en").is_ok());
        assert!(validate_language_code("EN").is_err());
        assert!(validate_language_code("eng").is_err());
    }
}
