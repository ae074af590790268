use diesel::connection::SimpleConnection;
use log::info;

use crate::shared::utils::DbPool;

pub fn create_schema_migration() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        role TEXT NOT NULL,
        username TEXT UNIQUE,
        password_hash TEXT,
        avatar_url TEXT,
        portfolio_size INTEGER NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS leave_requests (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL REFERENCES employees(id),
        leave_type TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        days DOUBLE PRECISION NOT NULL,
        half_day_period TEXT,
        is_paid BOOLEAN NOT NULL DEFAULT TRUE,
        reason TEXT,
        reviewed_by UUID REFERENCES employees(id),
        reviewed_at TIMESTAMPTZ,
        review_note TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_leave_requests_employee ON leave_requests(employee_id, leave_type, status);

    CREATE TABLE IF NOT EXISTS companies (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        tax_id TEXT,
        logo_url TEXT,
        grade TEXT,
        status TEXT NOT NULL DEFAULT 'lead',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS locations (
        id UUID PRIMARY KEY,
        company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
        code TEXT NOT NULL,
        name TEXT NOT NULL,
        address TEXT NOT NULL,
        district TEXT NOT NULL,
        province TEXT NOT NULL,
        postal_code TEXT NOT NULL,
        region TEXT,
        lat DOUBLE PRECISION,
        lng DOUBLE PRECISION,
        customer_type TEXT,
        customer_status TEXT NOT NULL DEFAULT 'active',
        status_note TEXT,
        owner_name TEXT,
        owner_phone TEXT,
        credit_term INTEGER,
        vat_type TEXT,
        notes TEXT,
        assigned_to UUID[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS contact_persons (
        id UUID PRIMARY KEY,
        location_id UUID NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        phone TEXT NOT NULL,
        line_id TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS visits (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL REFERENCES employees(id),
        location_id UUID NOT NULL REFERENCES locations(id),
        check_in_time TIMESTAMPTZ NOT NULL,
        check_out_time TIMESTAMPTZ,
        objectives TEXT[] NOT NULL DEFAULT '{}',
        notes TEXT,
        images TEXT[] NOT NULL DEFAULT '{}',
        met_owner BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_visits_employee ON visits(employee_id, check_in_time DESC);

    CREATE TABLE IF NOT EXISTS sales_tasks (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        objectives TEXT[] NOT NULL DEFAULT '{}',
        assignee_id UUID NOT NULL REFERENCES employees(id),
        company_id UUID REFERENCES companies(id),
        location_id UUID REFERENCES locations(id),
        due_date TIMESTAMPTZ NOT NULL,
        priority TEXT NOT NULL DEFAULT 'medium',
        status TEXT NOT NULL DEFAULT 'pending',
        completion_note TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS assets (
        id UUID PRIMARY KEY,
        serial_number TEXT NOT NULL UNIQUE,
        model_name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'AVAILABLE',
        condition TEXT NOT NULL DEFAULT 'NEW',
        current_location_id UUID REFERENCES locations(id),
        cost DOUBLE PRECISION NOT NULL DEFAULT 0,
        purchase_date DATE,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS spare_parts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        part_number TEXT NOT NULL UNIQUE,
        stock INTEGER NOT NULL DEFAULT 0,
        min_stock INTEGER NOT NULL DEFAULT 0,
        price DOUBLE PRECISION NOT NULL DEFAULT 0,
        image_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS maintenance_tasks (
        id UUID PRIMARY KEY,
        asset_id UUID NOT NULL REFERENCES assets(id),
        title TEXT NOT NULL,
        description TEXT,
        priority TEXT NOT NULL DEFAULT 'medium',
        status TEXT NOT NULL DEFAULT 'pending',
        assigned_to UUID REFERENCES employees(id),
        scheduled_date TIMESTAMPTZ,
        started_date TIMESTAMPTZ,
        completed_date TIMESTAMPTZ,
        estimated_hours DOUBLE PRECISION,
        actual_hours DOUBLE PRECISION,
        notes TEXT,
        total_cost DOUBLE PRECISION NOT NULL DEFAULT 0,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS task_part_usage (
        id UUID PRIMARY KEY,
        task_id UUID NOT NULL REFERENCES maintenance_tasks(id) ON DELETE CASCADE,
        part_id UUID NOT NULL REFERENCES spare_parts(id),
        quantity INTEGER NOT NULL,
        price_at_time DOUBLE PRECISION NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS projects (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        company_id UUID REFERENCES companies(id),
        description TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL DEFAULT 'development',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS samples (
        id UUID PRIMARY KEY,
        product_id UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        sample_number TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 1,
        status TEXT NOT NULL DEFAULT 'sent',
        sent_by UUID NOT NULL REFERENCES employees(id),
        due_date DATE,
        notes TEXT,
        images TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS sample_feedback (
        id UUID PRIMARY KEY,
        sample_id UUID NOT NULL UNIQUE REFERENCES samples(id) ON DELETE CASCADE,
        feedback_by UUID NOT NULL REFERENCES employees(id),
        visit_id UUID REFERENCES visits(id),
        rating INTEGER,
        customer_reaction TEXT,
        comments TEXT,
        images TEXT[] NOT NULL DEFAULT '{}',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS rnd_tasks (
        id UUID PRIMARY KEY,
        project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        sample_id UUID REFERENCES samples(id),
        title TEXT NOT NULL,
        description TEXT,
        task_type TEXT NOT NULL DEFAULT 'general',
        assignee_id UUID NOT NULL REFERENCES employees(id),
        created_by UUID NOT NULL REFERENCES employees(id),
        due_date TIMESTAMPTZ,
        priority TEXT NOT NULL DEFAULT 'medium',
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE TABLE IF NOT EXISTS activity_logs (
        id UUID PRIMARY KEY,
        employee_id UUID NOT NULL,
        employee_name TEXT NOT NULL,
        activity_type TEXT NOT NULL,
        description TEXT NOT NULL,
        metadata JSONB NOT NULL DEFAULT '{}',
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );

    CREATE INDEX IF NOT EXISTS idx_activity_logs_recorded ON activity_logs(recorded_at DESC);
    "#
}

pub fn run_schema_migration(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    conn.batch_execute(create_schema_migration())?;
    info!("Database schema is up to date");
    Ok(())
}
