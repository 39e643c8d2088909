use crate::domain::model::{Coordinates, Currency, DistanceUnit, EfficiencyUnit, FuelType};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "filltrip")]
#[command(about = "Trip fuel cost calculator and vehicle efficiency lookup")]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./filltrip.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute liters needed and total cost for a trip
    Calc(CalcArgs),
    /// Search the vehicle catalog
    Search {
        /// Free-text query, e.g. "toyota vios"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Plan a driving route between two coordinates
    Route {
        /// Start as "lon,lat"
        #[arg(long, value_parser = parse_coordinates)]
        from: Coordinates,
        /// Destination as "lon,lat"
        #[arg(long, value_parser = parse_coordinates)]
        to: Coordinates,
    },
    /// Refuel log grouped by month
    Logs,
    /// Saved trips grouped by month
    Trips,
    /// Add a refuel log entry
    AddLog {
        #[arg(long)]
        vehicle_name: String,
        #[arg(long)]
        odometer_km: f64,
        #[arg(long)]
        liters: f64,
        #[arg(long)]
        price_per_liter: f64,
        /// Defaults to liters x price
        #[arg(long)]
        total_cost: Option<f64>,
        #[arg(long, default_value = "Gasoline / Unleaded (91)")]
        fuel_type: FuelType,
        #[arg(long, default_value = "")]
        station: String,
        #[arg(long, default_value = "PHP")]
        currency: Currency,
    },
    /// Delete a refuel log entry
    DeleteLog { id: i64 },
    /// Search for places or manage saved places
    Places {
        #[command(subcommand)]
        action: PlacesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlacesCommand {
    /// Look up places by name (at least 3 characters)
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Saved places
    List,
    /// Save a place
    Add {
        #[arg(long)]
        name: String,
        /// Position as "lon,lat"
        #[arg(long, value_parser = parse_coordinates)]
        at: Coordinates,
    },
    /// Delete a saved place
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct CalcArgs {
    /// Trip distance; ignored when --from/--to plan a route
    #[arg(long, default_value = "")]
    pub distance: String,

    #[arg(long, default_value = "km")]
    pub distance_unit: DistanceUnit,

    /// Fuel efficiency; prefilled when --vehicle matches
    #[arg(long, default_value = "")]
    pub efficiency: String,

    #[arg(long, default_value = "km/L")]
    pub efficiency_unit: EfficiencyUnit,

    /// Price per liter
    #[arg(long, default_value = "")]
    pub price: String,

    #[arg(long, default_value = "PHP")]
    pub currency: Currency,

    #[arg(long, default_value = "Gasoline / Unleaded (91)")]
    pub fuel_type: FuelType,

    /// Vehicle query; the best catalog match supplies the efficiency
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Route start as "lon,lat"
    #[arg(long, value_parser = parse_coordinates, conflicts_with = "from_place")]
    pub from: Option<Coordinates>,

    /// Route destination as "lon,lat"
    #[arg(long, value_parser = parse_coordinates, conflicts_with = "to_place")]
    pub to: Option<Coordinates>,

    /// Route start looked up by name; the best match is used
    #[arg(long)]
    pub from_place: Option<String>,

    /// Route destination looked up by name; the best match is used
    #[arg(long)]
    pub to_place: Option<String>,

    /// Start name stored with the trip (defaults to the looked-up name)
    #[arg(long)]
    pub start_name: Option<String>,

    /// Destination name stored with the trip (defaults to the looked-up name)
    #[arg(long)]
    pub end_name: Option<String>,
}

pub fn parse_coordinates(s: &str) -> Result<Coordinates, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lon,lat\", got \"{}\"", s))?;
    let longitude: f64 = lon.trim().parse().map_err(|e| format!("longitude: {}", e))?;
    let latitude: f64 = lat.trim().parse().map_err(|e| format!("latitude: {}", e))?;
    if !(-180.0..=180.0).contains(&longitude) || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("coordinates out of range: {}", s));
    }
    Ok(Coordinates {
        longitude,
        latitude,
    })
}
