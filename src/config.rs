use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Attendance geofence (GPS check-ins must fall inside this circle)
    pub office_lat: f64,
    pub office_lng: f64,
    pub geofence_radius_m: f64,

    // Fallback workday when an employee has no shift assigned for the date
    pub workday_start: NaiveTime,
    pub workday_minutes: i64,
    pub grace_minutes: i64,

    // Housekeeping
    pub message_retention_days: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            office_lat: env::var("OFFICE_LAT")
                .unwrap_or_else(|_| "0.0".to_string())
                .parse()
                .unwrap(),
            office_lng: env::var("OFFICE_LNG")
                .unwrap_or_else(|_| "0.0".to_string())
                .parse()
                .unwrap(),
            geofence_radius_m: env::var("GEOFENCE_RADIUS_M")
                .unwrap_or_else(|_| "250".to_string())
                .parse()
                .unwrap(),

            workday_start: NaiveTime::parse_from_str(
                &env::var("WORKDAY_START").unwrap_or_else(|_| "09:00".to_string()),
                "%H:%M",
            )
            .unwrap(),
            workday_minutes: env::var("WORKDAY_MINUTES")
                .unwrap_or_else(|_| "480".to_string()) // default 8h
                .parse()
                .unwrap(),
            grace_minutes: env::var("GRACE_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),

            message_retention_days: env::var("MESSAGE_RETENTION_DAYS")
                .unwrap_or_else(|_| "90".to_string())
                .parse()
                .unwrap(),
        }
    }
}
