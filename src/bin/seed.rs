//! Populates the database with fixture data for development.
//!
//! Re-runnable: dependent tables are cleared in FK order before reseeding.

use chrono::{Duration, NaiveDate, Utc};
use diesel::prelude::*;
use dotenvy::dotenv;
use log::info;
use uuid::Uuid;

use fieldserver::assets::{Asset, SparePart};
use fieldserver::auth::hash_password;
use fieldserver::bootstrap::run_schema_migration;
use fieldserver::config::AppConfig;
use fieldserver::customers::{Company, ContactPerson, Location};
use fieldserver::employees::Employee;
use fieldserver::maintenance::MaintenanceTask;
use fieldserver::shared::schema::{
    activity_logs, assets, companies, contact_persons, employees, leave_requests, locations,
    maintenance_tasks, products, projects, rnd_tasks, sales_tasks, sample_feedback, samples,
    spare_parts, task_part_usage, visits,
};
use fieldserver::shared::utils::create_conn;
use fieldserver::tasks::SalesTask;

fn clear_tables(conn: &mut PgConnection) -> anyhow::Result<()> {
    diesel::delete(activity_logs::table).execute(conn)?;
    diesel::delete(sample_feedback::table).execute(conn)?;
    diesel::delete(rnd_tasks::table).execute(conn)?;
    diesel::delete(samples::table).execute(conn)?;
    diesel::delete(products::table).execute(conn)?;
    diesel::delete(projects::table).execute(conn)?;
    diesel::delete(task_part_usage::table).execute(conn)?;
    diesel::delete(maintenance_tasks::table).execute(conn)?;
    diesel::delete(assets::table).execute(conn)?;
    diesel::delete(spare_parts::table).execute(conn)?;
    diesel::delete(visits::table).execute(conn)?;
    diesel::delete(sales_tasks::table).execute(conn)?;
    diesel::delete(leave_requests::table).execute(conn)?;
    diesel::delete(contact_persons::table).execute(conn)?;
    diesel::delete(locations::table).execute(conn)?;
    diesel::delete(companies::table).execute(conn)?;
    diesel::delete(employees::table).execute(conn)?;
    Ok(())
}

fn seed_employee(
    conn: &mut PgConnection,
    name: &str,
    email: &str,
    phone: &str,
    role: &str,
    username: &str,
    password: &str,
    portfolio_size: i32,
) -> anyhow::Result<Uuid> {
    let now = Utc::now();
    let employee = Employee {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        role: role.to_string(),
        username: Some(username.to_string()),
        password_hash: Some(hash_password(password).map_err(|e| anyhow::anyhow!("{e}"))?),
        avatar_url: None,
        portfolio_size,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(employees::table)
        .values(&employee)
        .execute(conn)?;

    Ok(employee.id)
}

fn seed_company(
    conn: &mut PgConnection,
    name: &str,
    status: &str,
    locs: &[(&str, &str, &str, &str)],
    assigned_to: Uuid,
) -> anyhow::Result<Vec<Uuid>> {
    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tax_id: None,
        logo_url: None,
        grade: Some("B".to_string()),
        status: status.to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(companies::table)
        .values(&company)
        .execute(conn)?;

    let mut location_ids = Vec::new();
    for (code, loc_name, district, province) in locs {
        let location = Location {
            id: Uuid::new_v4(),
            company_id: company.id,
            code: code.to_string(),
            name: loc_name.to_string(),
            address: format!("88 Moo 4, {district}"),
            district: district.to_string(),
            province: province.to_string(),
            postal_code: "50000".to_string(),
            region: Some("north".to_string()),
            lat: None,
            lng: None,
            customer_type: Some("cafe".to_string()),
            customer_status: "active".to_string(),
            status_note: None,
            owner_name: None,
            owner_phone: None,
            credit_term: Some(30),
            vat_type: Some("include".to_string()),
            notes: None,
            assigned_to: vec![assigned_to],
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(locations::table)
            .values(&location)
            .execute(conn)?;

        let contact = ContactPerson {
            id: Uuid::new_v4(),
            location_id: location.id,
            name: format!("Khun {loc_name} owner"),
            role: "owner".to_string(),
            phone: "081-555-0101".to_string(),
            line_id: None,
            created_at: now,
        };

        diesel::insert_into(contact_persons::table)
            .values(&contact)
            .execute(conn)?;

        location_ids.push(location.id);
    }

    Ok(location_ids)
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    let pool = create_conn(&config.database.url, config.database.max_connections)?;
    run_schema_migration(&pool)?;

    let mut conn = pool.get()?;

    info!("Clearing existing data");
    clear_tables(&mut conn)?;

    info!("Seeding employees");
    let manager = seed_employee(
        &mut conn,
        "Wipada Charoensuk",
        "wipada@example.com",
        "081-000-0001",
        "manager",
        "wipada",
        "changeme",
        0,
    )?;
    let nida = seed_employee(
        &mut conn,
        "Nida Somjai",
        "nida@example.com",
        "081-000-0002",
        "sales",
        "nida",
        "changeme",
        25,
    )?;
    let krit = seed_employee(
        &mut conn,
        "Krit Boonmee",
        "krit@example.com",
        "081-000-0003",
        "sales",
        "krit",
        "changeme",
        18,
    )?;
    let tle = seed_employee(
        &mut conn,
        "Tle Prasert",
        "tle@example.com",
        "081-000-0004",
        "maintenance",
        "tle",
        "changeme",
        0,
    )?;

    info!("Seeding companies and locations");
    let cafe_locations = seed_company(
        &mut conn,
        "Baan Suan Group",
        "existing",
        &[
            ("BSG-01", "Baan Suan Cafe Nimman", "Mueang", "Chiang Mai"),
            ("BSG-02", "Baan Suan Cafe Airport", "Mueang", "Chiang Mai"),
        ],
        nida,
    )?;
    seed_company(
        &mut conn,
        "Rimping Trading",
        "lead",
        &[("RPT-01", "Rimping Warehouse", "Hang Dong", "Chiang Mai")],
        krit,
    )?;

    info!("Seeding spare parts and assets");
    let now = Utc::now();
    let parts = [
        ("Compressor valve", "CV-100", 12, 4, 450.0),
        ("Door gasket", "DG-220", 30, 10, 85.0),
        ("Thermostat unit", "TU-310", 6, 2, 690.0),
    ];
    for (name, part_number, stock, min_stock, price) in parts {
        let part = SparePart {
            id: Uuid::new_v4(),
            name: name.to_string(),
            part_number: part_number.to_string(),
            stock,
            min_stock,
            price,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(spare_parts::table)
            .values(&part)
            .execute(&mut conn)?;
    }

    let fridge = Asset {
        id: Uuid::new_v4(),
        serial_number: "FRZ-2023-0417".to_string(),
        model_name: "IceCube 400L".to_string(),
        status: "RENTED".to_string(),
        condition: "USED".to_string(),
        current_location_id: cafe_locations.first().copied(),
        cost: 28500.0,
        purchase_date: NaiveDate::from_ymd_opt(2023, 4, 17),
        notes: None,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(assets::table)
        .values(&fridge)
        .execute(&mut conn)?;

    info!("Seeding maintenance and sales tasks");
    let maintenance = MaintenanceTask {
        id: Uuid::new_v4(),
        asset_id: fridge.id,
        title: "Quarterly freezer service".to_string(),
        description: Some("Check compressor and door seals".to_string()),
        priority: "medium".to_string(),
        status: "assigned".to_string(),
        assigned_to: Some(tle),
        scheduled_date: Some(now + Duration::days(3)),
        started_date: None,
        completed_date: None,
        estimated_hours: Some(2.0),
        actual_hours: None,
        notes: None,
        total_cost: 0.0,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(maintenance_tasks::table)
        .values(&maintenance)
        .execute(&mut conn)?;

    let task = SalesTask {
        id: Uuid::new_v4(),
        title: "Follow up on Q3 order".to_string(),
        description: None,
        objectives: vec!["sales".to_string()],
        assignee_id: nida,
        company_id: None,
        location_id: cafe_locations.first().copied(),
        due_date: now + Duration::days(7),
        priority: "high".to_string(),
        status: "pending".to_string(),
        completion_note: None,
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(sales_tasks::table)
        .values(&task)
        .execute(&mut conn)?;

    info!("Seed complete (admin login: wipada, manager id {manager})");

    Ok(())
}
