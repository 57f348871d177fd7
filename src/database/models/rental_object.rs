use sqlx::FromRow;

use crate::error::{RentalError, RentalResult};
use crate::rental::{NewRentalObject, RentalImage, RentalKind, RentalObject};
use crate::utils::logging::{log_database_error, log_database_operation};
use crate::utils::validation::MAX_IMAGES_PER_OBJECT;

#[derive(Debug, Clone, FromRow)]
pub struct RentalObjectRow {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub min_duration_days: i64,
    pub price_per_day: i64,
    pub is_available: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct RentalImageRow {
    pub id: i64,
    pub url: String,
}

impl RentalObject {
    /// Stores an object with its locations and images in one transaction.
    ///
    /// Everything is validated first; unknown locations roll the whole insert back.
    pub async fn create(pool: &sqlx::SqlitePool, fields: NewRentalObject) -> RentalResult<RentalObject> {
        let object = RentalObject::new(fields)?;
        log_database_operation("INSERT", "rental_objects", Some(&object.name));

        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO rental_objects (name, kind, min_duration_days, price_per_day, is_available)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
        .bind(&object.name)
        .bind(object.kind.as_str())
        .bind(i64::from(object.min_duration_days))
        .bind(object.price_per_day)
        .bind(object.is_available)
        .execute(&mut tx)
        .await?;
        let id = result.last_insert_rowid();

        for location_id in &object.locations {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM service_locations WHERE id = ?")
                .bind(*location_id)
                .fetch_one(&mut tx)
                .await?;
            if exists == 0 {
                return Err(RentalError::not_found(format!("service location {}", location_id)));
            }

            sqlx::query("INSERT INTO rental_object_locations (rental_object_id, service_location_id) VALUES (?, ?)")
                .bind(id)
                .bind(*location_id)
                .execute(&mut tx)
                .await?;
        }

        for (position, image) in object.images().iter().enumerate() {
            sqlx::query("INSERT INTO rental_object_images (rental_object_id, position, url) VALUES (?, ?, ?)")
                .bind(id)
                .bind(position as i64)
                .bind(&image.url)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| RentalError::not_found(format!("rental object {}", id)))
    }

    /// Appends an image unless the object already holds the maximum.
    pub async fn attach_image(
        pool: &sqlx::SqlitePool,
        rental_object_id: i64,
        url: &str,
    ) -> RentalResult<RentalImage> {
        let image = RentalImage::new(url)?;
        if Self::find_by_id(pool, rental_object_id).await?.is_none() {
            return Err(RentalError::not_found(format!("rental object {}", rental_object_id)));
        }

        log_database_operation("INSERT", "rental_object_images", Some(&image.url));
        // Count and insert in one statement
        let result = sqlx::query(
            r#"
            INSERT INTO rental_object_images (rental_object_id, position, url)
            SELECT ?,
                   (SELECT COALESCE(MAX(position) + 1, 0) FROM rental_object_images WHERE rental_object_id = ?),
                   ?
            WHERE (SELECT COUNT(*) FROM rental_object_images WHERE rental_object_id = ?) < ?
            "#
        )
        .bind(rental_object_id)
        .bind(rental_object_id)
        .bind(&image.url)
        .bind(rental_object_id)
        .bind(MAX_IMAGES_PER_OBJECT as i64)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RentalError::validation(format!(
                "Rental object {} already has {} images",
                rental_object_id, MAX_IMAGES_PER_OBJECT
            )));
        }

        Ok(RentalImage {
            id: Some(result.last_insert_rowid()),
            url: image.url,
        })
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> RentalResult<Option<RentalObject>> {
        let row = sqlx::query_as::<_, RentalObjectRow>(
            "SELECT id, name, kind, min_duration_days, price_per_day, is_available FROM rental_objects WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match row {
            Some(row) => Ok(Some(load_relations(pool, row).await?)),
            None => Ok(None),
        }
    }

    /// Objects currently offered for rent.
    pub async fn find_available(pool: &sqlx::SqlitePool) -> RentalResult<Vec<RentalObject>> {
        let rows = sqlx::query_as::<_, RentalObjectRow>(
            "SELECT id, name, kind, min_duration_days, price_per_day, is_available FROM rental_objects WHERE is_available = 1 ORDER BY name"
        )
        .fetch_all(pool)
        .await?;

        let mut objects = Vec::with_capacity(rows.len());
        for row in rows {
            objects.push(load_relations(pool, row).await?);
        }
        Ok(objects)
    }

    pub async fn set_available(pool: &sqlx::SqlitePool, id: i64, is_available: bool) -> RentalResult<()> {
        let result = sqlx::query("UPDATE rental_objects SET is_available = ? WHERE id = ?")
            .bind(is_available)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RentalError::not_found(format!("rental object {}", id)));
        }
        Ok(())
    }

    /// Deletes an object; its images, location links and bookings cascade.
    pub async fn delete(pool: &sqlx::SqlitePool, id: i64) -> RentalResult<bool> {
        log_database_operation("DELETE", "rental_objects", Some(&id.to_string()));

        let result = sqlx::query("DELETE FROM rental_objects WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                log_database_error("DELETE", "rental_objects", &e.to_string(), Some(&id.to_string()));
                e
            })?;

        Ok(result.rows_affected() > 0)
    }
}

async fn load_relations(pool: &sqlx::SqlitePool, row: RentalObjectRow) -> RentalResult<RentalObject> {
    let kind = row.kind.parse::<RentalKind>().map_err(|_| {
        RentalError::integrity(format!("rental object {} has unknown kind '{}'", row.id, row.kind))
    })?;
    let min_duration_days = u32::try_from(row.min_duration_days).map_err(|_| {
        RentalError::integrity(format!("rental object {} has minimum duration {}", row.id, row.min_duration_days))
    })?;

    let locations = sqlx::query_scalar::<_, i64>(
        "SELECT service_location_id FROM rental_object_locations WHERE rental_object_id = ? ORDER BY service_location_id"
    )
    .bind(row.id)
    .fetch_all(pool)
    .await?;

    let images = sqlx::query_as::<_, RentalImageRow>(
        "SELECT id, url FROM rental_object_images WHERE rental_object_id = ? ORDER BY position"
    )
    .bind(row.id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|image| RentalImage {
        id: Some(image.id),
        url: image.url,
    })
    .collect();

    Ok(RentalObject::from_parts(
        row.id,
        row.name,
        kind,
        min_duration_days,
        row.price_per_day,
        row.is_available,
        locations,
        images,
    ))
}
