use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rental_booking_bot::database::connection::DatabaseManager;
use rental_booking_bot::error::RentalError;
use rental_booking_bot::rental::{BlockingPolicy, NewRentalObject, RegistrationBook, RentalKind, RentalObject};
use rental_booking_bot::scheduling::{NewServiceLocation, ServiceLocation, WorkDay};
use rental_booking_bot::users::{NewTelegramUser, TelegramUser, TelegramUserProfilePhoto};
use tempfile::{tempdir, TempDir};

const USER: i64 = 5550001;

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

fn t(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// A user plus a car at a location open 08:00-20:00 every day.
async fn seed_car(db: &DatabaseManager) -> Result<i64> {
    TelegramUser::get_or_create(&db.pool, NewTelegramUser::new(USER, "Renter")).await?;

    let location = ServiceLocation::create(&db.pool, NewServiceLocation::new("Airport Desk", "Tbilisi")).await?;
    let location_id = location.id.unwrap();
    for index in 0..7u8 {
        let work_day = WorkDay::create(&db.pool, &WorkDay::from_index(index, Some(t(8)), Some(t(20)))?).await?;
        ServiceLocation::attach_work_day(&db.pool, location_id, work_day.id.unwrap()).await?;
    }

    let mut car = NewRentalObject::new("Toyota Corolla", RentalKind::Car, 100);
    car.locations = vec![location_id];
    car.images = vec!["https://cdn.example.com/corolla/front.jpg".to_string()];
    let car = RentalObject::create(&db.pool, car).await?;

    Ok(car.id.unwrap())
}

#[tokio::test]
async fn test_duplicate_work_day_is_integrity_error() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let monday = WorkDay::new(Weekday::Mon, Some(t(8)), Some(t(19)))?;
    let stored = WorkDay::create(&db.pool, &monday).await?;
    assert!(stored.id.is_some());

    let result = WorkDay::create(&db.pool, &monday).await;
    assert!(matches!(result, Err(RentalError::Integrity(_))));

    // Open bounds take part in the uniqueness rule too
    let all_day = WorkDay::new(Weekday::Sun, None, None)?;
    WorkDay::create(&db.pool, &all_day).await?;
    assert!(matches!(
        WorkDay::create(&db.pool, &all_day).await,
        Err(RentalError::Integrity(_))
    ));

    assert_eq!(WorkDay::find_all(&db.pool).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_location_availability_after_load() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let location = ServiceLocation::create(&db.pool, NewServiceLocation::new("Harbour Desk", "Split")).await?;
    let location_id = location.id.unwrap();
    let monday = WorkDay::create(&db.pool, &WorkDay::new(Weekday::Mon, Some(t(8)), Some(t(19)))?).await?;
    assert!(ServiceLocation::attach_work_day(&db.pool, location_id, monday.id.unwrap()).await?);
    assert!(!ServiceLocation::attach_work_day(&db.pool, location_id, monday.id.unwrap()).await?);

    let thursday = NaiveDate::from_ymd_opt(2025, 8, 7).unwrap();
    let loaded = ServiceLocation::find_by_id(&db.pool, location_id).await?.unwrap();
    assert_eq!(loaded.available_days().len(), 1);
    assert!(!loaded.is_available(thursday, t(12)));

    let first = WorkDay::create(&db.pool, &WorkDay::new(Weekday::Thu, Some(t(8)), Some(t(11)))?).await?;
    let second = WorkDay::create(&db.pool, &WorkDay::new(Weekday::Thu, Some(t(14)), Some(t(18)))?).await?;
    ServiceLocation::attach_work_day(&db.pool, location_id, first.id.unwrap()).await?;
    ServiceLocation::attach_work_day(&db.pool, location_id, second.id.unwrap()).await?;

    let loaded = ServiceLocation::find_by_id(&db.pool, location_id).await?.unwrap();
    assert!(loaded.is_available(thursday, t(10)));
    assert!(!loaded.is_available(thursday, t(12)));
    assert!(loaded.is_available(thursday, t(15)));

    assert!(matches!(
        ServiceLocation::attach_work_day(&db.pool, location_id, 9999).await,
        Err(RentalError::NotFound(_))
    ));

    // Deleting a window detaches it from the location
    WorkDay::delete(&db.pool, monday.id.unwrap()).await?;
    let loaded = ServiceLocation::find_by_id(&db.pool, location_id).await?.unwrap();
    assert_eq!(loaded.available_days().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_rental_object_creation_and_image_cap() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;

    let car = RentalObject::find_by_id(&db.pool, car_id).await?.unwrap();
    assert_eq!(car.kind, RentalKind::Car);
    assert_eq!(car.price_per_day, 100);
    assert_eq!(car.locations.len(), 1);
    assert_eq!(car.images().len(), 1);

    for i in 1..10 {
        RentalObject::attach_image(&db.pool, car_id, &format!("https://cdn.example.com/corolla/{}.jpg", i)).await?;
    }
    let result = RentalObject::attach_image(&db.pool, car_id, "https://cdn.example.com/corolla/extra.jpg").await;
    assert!(matches!(result, Err(RentalError::Validation(_))));

    let car = RentalObject::find_by_id(&db.pool, car_id).await?.unwrap();
    assert_eq!(car.images().len(), 10);
    assert_eq!(car.images()[0].url, "https://cdn.example.com/corolla/front.jpg");

    Ok(())
}

#[tokio::test]
async fn test_invalid_rental_object_is_not_stored() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let mut bike = NewRentalObject::new("Honda PCX", RentalKind::Moto, 30);
    bike.images = (0..11).map(|i| format!("photo-{}", i)).collect();
    assert!(matches!(
        RentalObject::create(&db.pool, bike).await,
        Err(RentalError::Validation(_))
    ));

    let mut orphan = NewRentalObject::new("Orphan board", RentalKind::Wakeboard, 20);
    orphan.locations = vec![42];
    assert!(matches!(
        RentalObject::create(&db.pool, orphan).await,
        Err(RentalError::NotFound(_))
    ));

    // The failed transaction left nothing behind
    assert!(RentalObject::find_available(&db.pool).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_booking_overlap_and_confirmation() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;
    let policy = BlockingPolicy::ConfirmedOnly;

    let first = RegistrationBook::create(&db.pool, USER, car_id, at(1, 10), at(5, 10), policy).await?;
    assert_eq!(first.duration_days(), 4);

    // Pending bookings do not block each other under the default policy
    let second = RegistrationBook::create(&db.pool, USER, car_id, at(3, 10), at(6, 10), policy).await?;

    let confirmed = RegistrationBook::confirm(&db.pool, first.id).await?;
    assert!(confirmed.is_confirmed());

    match RegistrationBook::confirm(&db.pool, second.id).await {
        Err(RentalError::BookingOverlap { existing, .. }) => assert_eq!(existing, first.id),
        other => panic!("expected overlap, got {:?}", other),
    }
    match RegistrationBook::create(&db.pool, USER, car_id, at(4, 10), at(8, 10), policy).await {
        Err(RentalError::BookingOverlap { existing, .. }) => assert_eq!(existing, first.id),
        other => panic!("expected overlap, got {:?}", other),
    }

    // Adjacent interval is free
    RegistrationBook::create(&db.pool, USER, car_id, at(5, 10), at(7, 10), policy).await?;

    let bookings = RegistrationBook::find_by_rental_object(&db.pool, car_id).await?;
    assert_eq!(bookings.len(), 3);
    assert_eq!(bookings[0].id, first.id);

    Ok(())
}

#[tokio::test]
async fn test_all_bookings_policy_blocks_pending() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;
    let policy = BlockingPolicy::AllBookings;

    RegistrationBook::create(&db.pool, USER, car_id, at(1, 10), at(5, 10), policy).await?;
    let result = RegistrationBook::create(&db.pool, USER, car_id, at(2, 10), at(3, 10), policy).await;
    assert!(matches!(result, Err(RentalError::BookingOverlap { .. })));

    Ok(())
}

#[tokio::test]
async fn test_booking_rules_are_checked_before_insert() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;
    let policy = BlockingPolicy::ConfirmedOnly;

    assert!(matches!(
        RegistrationBook::create(&db.pool, USER, car_id, at(1, 6), at(4, 10), policy).await,
        Err(RentalError::Validation(_))
    ));
    assert!(matches!(
        RegistrationBook::create(&db.pool, 777, car_id, at(1, 10), at(4, 10), policy).await,
        Err(RentalError::NotFound(_))
    ));
    assert!(matches!(
        RegistrationBook::create(&db.pool, USER, 9999, at(1, 10), at(4, 10), policy).await,
        Err(RentalError::NotFound(_))
    ));

    RentalObject::set_available(&db.pool, car_id, false).await?;
    assert!(matches!(
        RegistrationBook::create(&db.pool, USER, car_id, at(1, 10), at(4, 10), policy).await,
        Err(RentalError::Validation(_))
    ));

    assert!(RegistrationBook::find_by_user(&db.pool, USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_payment_and_cancellation() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;
    let policy = BlockingPolicy::ConfirmedOnly;

    let booking = RegistrationBook::create(&db.pool, USER, car_id, at(1, 10), at(3, 10), policy).await?;
    let paid = RegistrationBook::store_payment(&db.pool, booking.id, "pay_123", 200).await?;
    assert_eq!(paid.payment_id(), Some("pay_123"));

    let stored = RegistrationBook::find_by_id(&db.pool, booking.id).await?.unwrap();
    assert_eq!(stored.amount(), Some(200));

    RegistrationBook::confirm(&db.pool, booking.id).await?;
    assert!(matches!(
        RegistrationBook::store_payment(&db.pool, booking.id, "pay_456", 300).await,
        Err(RentalError::Validation(_))
    ));
    assert!(matches!(
        RegistrationBook::cancel(&db.pool, booking.id).await,
        Err(RentalError::Validation(_))
    ));

    let pending = RegistrationBook::create(&db.pool, USER, car_id, at(10, 10), at(12, 10), policy).await?;
    RegistrationBook::cancel(&db.pool, pending.id).await?;
    assert!(RegistrationBook::find_by_id(&db.pool, pending.id).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_deleting_rental_object_cascades() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let car_id = seed_car(&db).await?;

    let booking = RegistrationBook::create(
        &db.pool,
        USER,
        car_id,
        at(1, 10),
        at(3, 10),
        BlockingPolicy::ConfirmedOnly,
    )
    .await?;

    assert!(RentalObject::delete(&db.pool, car_id).await?);
    assert!(!RentalObject::delete(&db.pool, car_id).await?);

    assert!(RentalObject::find_by_id(&db.pool, car_id).await?.is_none());
    assert!(RegistrationBook::find_by_id(&db.pool, booking.id).await?.is_none());

    let images = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rental_object_images WHERE rental_object_id = ?")
        .bind(car_id)
        .fetch_one(&db.pool)
        .await?;
    assert_eq!(images, 0);

    Ok(())
}

#[tokio::test]
async fn test_telegram_user_get_or_create() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let mut fields = NewTelegramUser::new(1234567890, "Ivan");
    fields.username = Some("ivan_rides".to_string());

    let (user, created) = TelegramUser::get_or_create(&db.pool, fields.clone()).await?;
    assert!(created);
    assert_eq!(user.username.as_deref(), Some("ivan_rides"));

    fields.first_name = "Renamed".to_string();
    let (again, created) = TelegramUser::get_or_create(&db.pool, fields).await?;
    assert!(!created);
    assert_eq!(again.first_name, "Ivan");
    assert_eq!(again.registered_at, user.registered_at);

    assert!(TelegramUser::find_by_id(&db.pool, 42).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_profile_photos_belong_to_users() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    TelegramUser::get_or_create(&db.pool, NewTelegramUser::new(USER, "Renter")).await?;

    let mut photo = TelegramUserProfilePhoto::new(USER, "AgACAgIAAx", "AQADf", 640, 640)?;
    photo.file_size = Some(48_213);
    let stored = TelegramUserProfilePhoto::create(&db.pool, &photo).await?;
    assert!(stored.id.is_some());

    let photos = TelegramUserProfilePhoto::find_by_user(&db.pool, USER).await?;
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].file_size, Some(48_213));

    let stranger = TelegramUserProfilePhoto::new(31337, "AgACAgIAAy", "AQADg", 160, 160)?;
    assert!(matches!(
        TelegramUserProfilePhoto::create(&db.pool, &stranger).await,
        Err(RentalError::NotFound(_))
    ));

    Ok(())
}
