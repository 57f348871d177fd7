//! # Rental Booking Bot
//!
//! Data layer for a Telegram bot that rents out cars, motorbikes, kites,
//! wakeboards, equipment, spa services and property.
//!
//! ## Features
//! - Service locations with weekly working hours, including split shifts
//! - Rental objects with pricing, minimum durations and up to ten images
//! - Bookings checked against working hours and overlapping reservations
//! - Telegram user profiles
//! - Persistent storage with SQLite

/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Error taxonomy shared by the domain and persistence layers
pub mod error;
/// Rental objects, bookings and the in-memory catalog
pub mod rental;
/// Working hours and service locations
pub mod scheduling;
/// HTTP health endpoints
pub mod services;
/// Telegram user profiles
pub mod users;
/// Utility functions for datetime, validation, and logging
pub mod utils;
