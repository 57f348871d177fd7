use sqlx::FromRow;

use crate::error::{RentalError, RentalResult};
use crate::scheduling::{NewServiceLocation, ServiceLocation, WorkDay};
use crate::utils::logging::log_database_operation;

#[derive(Debug, Clone, FromRow)]
pub struct ServiceLocationRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub city: String,
    pub rest_of_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i64,
}

impl ServiceLocationRow {
    fn into_location(self, work_days: Vec<WorkDay>) -> RentalResult<ServiceLocation> {
        let capacity = u32::try_from(self.capacity)
            .map_err(|_| RentalError::integrity(format!("location {} has capacity {}", self.id, self.capacity)))?;
        let mut location = ServiceLocation::new(NewServiceLocation {
            name: self.name,
            description: self.description,
            city: self.city,
            rest_of_address: self.rest_of_address,
            latitude: self.latitude,
            longitude: self.longitude,
            capacity,
        })?
        .with_id(self.id);

        for work_day in work_days {
            location.add_work_day(work_day);
        }
        Ok(location)
    }
}

const SELECT_LOCATION: &str =
    "SELECT id, name, description, city, rest_of_address, latitude, longitude, capacity FROM service_locations";

impl ServiceLocation {
    pub async fn create(pool: &sqlx::SqlitePool, fields: NewServiceLocation) -> RentalResult<ServiceLocation> {
        let location = ServiceLocation::new(fields)?;
        log_database_operation("INSERT", "service_locations", Some(&location.to_string()));

        let result = sqlx::query(
            r#"
            INSERT INTO service_locations (name, description, city, rest_of_address, latitude, longitude, capacity)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&location.name)
        .bind(&location.description)
        .bind(&location.city)
        .bind(&location.rest_of_address)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(i64::from(location.capacity))
        .execute(pool)
        .await?;

        Ok(location.with_id(result.last_insert_rowid()))
    }

    /// Links a stored window to a stored location. `false` if already linked.
    pub async fn attach_work_day(
        pool: &sqlx::SqlitePool,
        location_id: i64,
        work_day_id: i64,
    ) -> RentalResult<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM service_locations WHERE id = ?) + (SELECT COUNT(*) FROM work_days WHERE id = ?)"
        )
        .bind(location_id)
        .bind(work_day_id)
        .fetch_one(pool)
        .await?;
        if found < 2 {
            return Err(RentalError::not_found(format!(
                "service location {} or work day {}",
                location_id, work_day_id
            )));
        }

        log_database_operation(
            "INSERT",
            "service_location_work_days",
            Some(&format!("location {} work day {}", location_id, work_day_id)),
        );
        let result = sqlx::query(
            "INSERT OR IGNORE INTO service_location_work_days (service_location_id, work_day_id) VALUES (?, ?)"
        )
        .bind(location_id)
        .bind(work_day_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_by_id(pool: &sqlx::SqlitePool, id: i64) -> RentalResult<Option<ServiceLocation>> {
        let row = sqlx::query_as::<_, ServiceLocationRow>(&format!("{} WHERE id = ?", SELECT_LOCATION))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let work_days = WorkDay::find_by_location(pool, row.id).await?;
                Ok(Some(row.into_location(work_days)?))
            }
            None => Ok(None),
        }
    }

    pub async fn find_all(pool: &sqlx::SqlitePool) -> RentalResult<Vec<ServiceLocation>> {
        let rows = sqlx::query_as::<_, ServiceLocationRow>(&format!("{} ORDER BY name", SELECT_LOCATION))
            .fetch_all(pool)
            .await?;

        let mut locations = Vec::with_capacity(rows.len());
        for row in rows {
            let work_days = WorkDay::find_by_location(pool, row.id).await?;
            locations.push(row.into_location(work_days)?);
        }
        Ok(locations)
    }

    /// Locations serving a rental object.
    pub async fn find_by_rental_object(
        pool: &sqlx::SqlitePool,
        rental_object_id: i64,
    ) -> RentalResult<Vec<ServiceLocation>> {
        let rows = sqlx::query_as::<_, ServiceLocationRow>(
            r#"
            SELECT l.id, l.name, l.description, l.city, l.rest_of_address, l.latitude, l.longitude, l.capacity
            FROM service_locations l
            JOIN rental_object_locations ol ON ol.service_location_id = l.id
            WHERE ol.rental_object_id = ?
            ORDER BY l.name
            "#
        )
        .bind(rental_object_id)
        .fetch_all(pool)
        .await?;

        let mut locations = Vec::with_capacity(rows.len());
        for row in rows {
            let work_days = WorkDay::find_by_location(pool, row.id).await?;
            locations.push(row.into_location(work_days)?);
        }
        Ok(locations)
    }
}
