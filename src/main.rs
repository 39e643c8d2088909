use clap::Parser;
use filltrip::config::{CalcArgs, Cli, Command, PlacesCommand};
use filltrip::core::log_aggregator::{group_by_month, summarize, LogEntry, MonthGroup};
use filltrip::core::ConfigProvider;
use filltrip::domain::model::{
    format_amount, Coordinates, FuelLogEntry, NewFuelLog, NewPlace, SaveOutcome, TripLogEntry,
};
use filltrip::domain::ports::{Geocoder, LogSource, PlaceStore, RouteProvider};
use filltrip::utils::{logger, validation::Validate};
use filltrip::{
    compute_fuel_cost, AppConfig, CalculationDraft, DirectionsClient, FillTripError,
    HttpPersistence, Result, TripRecorder, VehicleMatcher,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }
    if cli.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(e: &FillTripError) -> i32 {
    match e {
        FillTripError::InvalidInput { .. }
        | FillTripError::InvalidEntry { .. }
        | FillTripError::UnrecognizedUnit { .. } => 2,
        FillTripError::Config { .. }
        | FillTripError::MissingConfig { .. }
        | FillTripError::InvalidConfigValue { .. } => 1,
        _ => 3,
    }
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Calc(args) => run_calc(args, config).await,
        Command::Search { query } => run_search(&query.join(" "), config),
        Command::Route { from, to } => {
            let summary = directions(config)?.route(from, to).await?;
            println!(
                "🗺️  {:.1} km • {} min",
                summary.distance_km, summary.duration_min
            );
            for (i, step) in summary.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            Ok(())
        }
        Command::Logs => {
            let Some(source) = signed_in(config)? else {
                return Ok(());
            };
            let entries = source.list_fuel_logs().await?;
            print_groups(&group_by_month(&entries), describe_fuel_log);
            Ok(())
        }
        Command::Trips => {
            let Some(source) = signed_in(config)? else {
                return Ok(());
            };
            let trips = source.list_trips().await?;
            print_groups(&group_by_month(&trips), describe_trip);
            Ok(())
        }
        Command::AddLog {
            vehicle_name,
            odometer_km,
            liters,
            price_per_liter,
            total_cost,
            fuel_type,
            station,
            currency,
        } => {
            let Some(source) = signed_in(config)? else {
                return Ok(());
            };
            let mut entry =
                NewFuelLog::new(&vehicle_name, odometer_km, liters, price_per_liter, total_cost)?;
            entry.fuel_type = fuel_type;
            entry.station = station.trim().to_string();
            entry.currency = currency;
            source.add_fuel_log(&entry).await?;
            println!("✅ Fuel entry added successfully!");
            Ok(())
        }
        Command::DeleteLog { id } => {
            let Some(source) = signed_in(config)? else {
                return Ok(());
            };
            if source.delete_fuel_log(id).await? {
                println!("✅ Fuel entry deleted successfully!");
            } else {
                println!("⚠️  Fuel entry {} was not deleted", id);
            }
            Ok(())
        }
        Command::Places { action } => run_places(action, config).await,
    }
}

async fn run_places(action: PlacesCommand, config: &AppConfig) -> Result<()> {
    match action {
        PlacesCommand::Search { query } => {
            let places = config.geocoder()?.search_places(&query.join(" ")).await?;
            if places.is_empty() {
                println!("No places found.");
            }
            for place in places {
                println!(
                    "{:>10.5},{:<9.5}  {}",
                    place.coordinates.longitude, place.coordinates.latitude, place.name
                );
            }
            Ok(())
        }
        PlacesCommand::List => {
            let Some(store) = signed_in(config)? else {
                return Ok(());
            };
            let places = store.list_places().await?;
            if places.is_empty() {
                println!("No saved places yet.");
            }
            for place in places {
                println!(
                    "{:>5}  {}  ({:.5}, {:.5})",
                    place.id, place.name, place.longitude, place.latitude
                );
            }
            Ok(())
        }
        PlacesCommand::Add { name, at } => {
            let Some(store) = signed_in(config)? else {
                return Ok(());
            };
            let place = NewPlace::new(&name, at)?;
            match store.add_place(&place).await? {
                SaveOutcome::Saved => println!("✅ Place saved successfully!"),
                SaveOutcome::AlreadySaved => println!("ℹ️  This place is already saved"),
            }
            Ok(())
        }
        PlacesCommand::Delete { id } => {
            let Some(store) = signed_in(config)? else {
                return Ok(());
            };
            if store.delete_place(id).await? {
                println!("✅ Place deleted");
            } else {
                println!("⚠️  Place not found or already deleted");
            }
            Ok(())
        }
    }
}

/// A route endpoint from raw coordinates or, failing that, the best place-search match.
async fn resolve_stop(
    coordinates: Option<Coordinates>,
    place: Option<&str>,
    config: &AppConfig,
) -> Result<Option<(Coordinates, Option<String>)>> {
    if let Some(coordinates) = coordinates {
        return Ok(Some((coordinates, None)));
    }
    let Some(query) = place else {
        return Ok(None);
    };
    let best = config
        .geocoder()?
        .search_places(query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| FillTripError::Geocoding {
            message: format!("no places match '{}'", query),
        })?;
    Ok(Some((best.coordinates, Some(best.name))))
}

async fn run_calc(args: CalcArgs, config: &AppConfig) -> Result<()> {
    let catalog = config.load_catalog()?;
    let matcher = VehicleMatcher::new(config.matcher.clone());

    let start = resolve_stop(args.from, args.from_place.as_deref(), config).await?;
    let end = resolve_stop(args.to, args.to_place.as_deref(), config).await?;
    let route = match (start, end) {
        (Some((from, found_start)), Some((to, found_end))) => {
            let start_name = args
                .start_name
                .or(found_start)
                .unwrap_or_else(|| "Start".to_string());
            let end_name = args
                .end_name
                .or(found_end)
                .unwrap_or_else(|| "Destination".to_string());
            let summary = directions(config)?.route(from, to).await?;
            println!(
                "📍 Route: {} → {} ({:.1} km • {} min)",
                start_name, end_name, summary.distance_km, summary.duration_min
            );
            Some(summary.into_context(&start_name, &end_name))
        }
        (None, None) => None,
        _ => {
            return Err(FillTripError::InvalidEntry {
                field: "route".to_string(),
                reason: "needs both a start and a destination".to_string(),
            })
        }
    };

    let mut draft = match &route {
        Some(route) => CalculationDraft::from_route(route),
        None => CalculationDraft {
            distance: args.distance,
            distance_unit: args.distance_unit,
            ..CalculationDraft::default()
        },
    };
    draft.efficiency = args.efficiency;
    draft.efficiency_unit = args.efficiency_unit;
    draft.price_per_liter = args.price;
    draft.currency = args.currency;
    draft.fuel_type = args.fuel_type;

    if let Some(query) = &args.vehicle {
        match matcher.search(query, &catalog).first() {
            Some(vehicle) => {
                draft.select_vehicle(vehicle);
                println!(
                    "🚗 {} ({} km/L • {})",
                    vehicle.label(),
                    vehicle.km_per_liter_avg,
                    vehicle.category
                );
            }
            None => tracing::warn!("No vehicle matches '{}'", query),
        }
    }

    let input = draft.to_input()?;
    let result = compute_fuel_cost(&input);
    println!("⛽ Fuel needed: {:.2} L", result.liters_needed);
    println!("💰 Total cost: {}", result.currency.format(result.total_cost));

    let persistence = HttpPersistence::from_config(config)?;
    let recorder = TripRecorder::new(Arc::new(persistence));
    if let Some(handle) = recorder.maybe_record_trip(
        &input,
        &result,
        route.as_ref(),
        config.auth_token().is_some(),
        draft.selected_vehicle.as_ref(),
    ) {
        // The runtime ends with main; let the single attempt finish.
        let _ = handle.await;
    }
    Ok(())
}

fn run_search(query: &str, config: &AppConfig) -> Result<()> {
    let catalog = config.load_catalog()?;
    let matches = VehicleMatcher::new(config.matcher.clone()).search_scored(query, &catalog);
    if matches.is_empty() {
        println!("No vehicles match '{}'", query);
        return Ok(());
    }
    for m in matches {
        println!(
            "{:>3}  {:<36} {:>5.1} km/L  {}",
            m.score,
            m.record.label(),
            m.record.km_per_liter_avg,
            m.record.category
        );
    }
    Ok(())
}

fn directions(config: &AppConfig) -> Result<DirectionsClient> {
    let token = config
        .routing_token()
        .ok_or_else(|| FillTripError::MissingConfig {
            field: "routing.access_token".to_string(),
        })?;
    DirectionsClient::new(&config.routing.endpoint, token, config.routing.timeout_seconds)
}

fn signed_in(config: &AppConfig) -> Result<Option<HttpPersistence>> {
    if config.auth_token().is_none() {
        tracing::warn!("Not signed in: set persistence.auth_token to use saved records");
        return Ok(None);
    }
    HttpPersistence::from_config(config).map(Some)
}

fn describe_fuel_log(entry: &FuelLogEntry) -> String {
    format!(
        "{}  {}  {:.0} {}  {:.1} L  {}",
        entry.created_at.as_deref().unwrap_or(""),
        entry.vehicle_name,
        entry.odometer_km,
        entry.distance_unit,
        entry.liters,
        format_amount(entry.total_cost, &entry.currency)
    )
}

fn describe_trip(trip: &TripLogEntry) -> String {
    format!(
        "{}  {} → {}  {:.1} km  {:.2} L  {}",
        trip.created_at.as_deref().unwrap_or(""),
        trip.start_location_name,
        trip.end_location_name,
        trip.distance_km,
        trip.liters_needed,
        format_amount(trip.fuel_cost, &trip.currency)
    )
}

fn print_groups<T: LogEntry>(groups: &[MonthGroup<T>], describe: impl Fn(&T) -> String) {
    if groups.is_empty() {
        println!("No entries yet.");
        return;
    }

    let totals = summarize(groups);
    println!(
        "📊 {} entries • {:.1} L • {:.1} km • {}",
        totals.total_entries,
        totals.total_liters,
        totals.total_distance_km,
        format_amount(totals.total_cost, "PHP")
    );

    for group in groups {
        println!(
            "\n{}: {} entr{} • {:.1} L • {}",
            group.label,
            group.total_entries,
            if group.total_entries == 1 { "y" } else { "ies" },
            group.total_liters,
            format_amount(group.total_cost, "PHP")
        );
        for item in &group.items {
            println!("  {}", describe(item));
        }
    }
}
