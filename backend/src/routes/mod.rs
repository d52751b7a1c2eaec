//! Route definitions for the Fabrication ERP

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/auth/logout", post(handlers::logout))
        .nest("/branches", branch_routes())
        .nest("/users", user_routes())
        .nest("/employees", employee_routes())
        .route("/attendance", get(handlers::list_attendance))
        .nest("/customers", customer_routes())
        .nest("/orders", order_routes())
        .nest("/production", production_routes())
        .nest("/machines", machine_routes())
        .nest("/materials", material_routes())
        .nest("/sellers", seller_routes())
        .nest("/purchases", purchase_routes())
        .nest("/usages", usage_routes())
        .nest("/stores", store_routes())
        .nest("/inventory", inventory_routes())
        .nest("/transfers", transfer_routes())
        .nest("/pos", pos_routes())
        .nest("/invoices", invoice_routes())
        .nest("/final-sales", final_sale_routes())
        .nest("/accounting", accounting_routes())
        .nest("/reports", report_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .merge(protected)
}

fn branch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_branches).post(handlers::create_branch))
        .route(
            "/:branch_id",
            get(handlers::get_branch)
                .put(handlers::update_branch)
                .delete(handlers::delete_branch),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route("/:user_id", get(handlers::get_user).put(handlers::update_user))
        .route("/:user_id/deactivate", post(handlers::deactivate_user))
        .route("/:user_id/activate", post(handlers::activate_user))
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_employees).post(handlers::create_employee))
        .route(
            "/:employee_id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .route("/:employee_id/check-in", post(handlers::check_in))
        .route("/:employee_id/check-out", post(handlers::check_out))
        .route("/:employee_id/attendance", put(handlers::mark_attendance))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route("/:order_id/status", put(handlers::update_order_status))
        .route("/:order_id/stage", get(handlers::get_stage_progress).post(handlers::advance_stage))
        .route("/:order_id/stage-logs", get(handlers::list_stage_logs))
}

fn production_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(handlers::list_production_entries).post(handlers::start_production_entry),
        )
        .route(
            "/entries/:entry_id",
            get(handlers::get_production_entry).put(handlers::update_production_entry),
        )
        .route("/entries/:entry_id/complete", post(handlers::complete_production_entry))
        .route("/entries/:entry_id/approve", post(handlers::approve_production_entry))
        .route("/entries/:entry_id/reject", post(handlers::reject_production_entry))
}

fn machine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_machines).post(handlers::create_machine))
        .route(
            "/:machine_id",
            get(handlers::get_machine)
                .put(handlers::update_machine)
                .delete(handlers::delete_machine),
        )
}

fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route("/low-stock", get(handlers::list_low_stock_materials))
        .route(
            "/:material_id",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
}

fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sellers).post(handlers::create_seller))
        .route(
            "/:seller_id",
            get(handlers::get_seller)
                .put(handlers::update_seller)
                .delete(handlers::delete_seller),
        )
}

fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_purchases).post(handlers::create_purchase))
        .route(
            "/:purchase_id",
            get(handlers::get_purchase)
                .put(handlers::update_purchase)
                .delete(handlers::delete_purchase),
        )
}

fn usage_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_usages).post(handlers::create_usage))
        .route(
            "/:usage_id",
            put(handlers::update_usage).delete(handlers::delete_usage),
        )
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stores).post(handlers::create_store))
        .route(
            "/:store_id",
            get(handlers::get_store)
                .put(handlers::update_store)
                .delete(handlers::delete_store),
        )
        .route(
            "/:store_id/inventory",
            get(handlers::list_store_inventory).put(handlers::upsert_store_inventory),
        )
}

fn inventory_routes() -> Router<AppState> {
    Router::new().route(
        "/:item_id",
        post(handlers::adjust_store_inventory).delete(handlers::delete_store_inventory),
    )
}

fn transfer_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_stock_transfers).post(handlers::create_stock_transfer),
    )
}

fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/quote", post(handlers::quote_bill))
        .route("/sales", get(handlers::list_sales).post(handlers::create_sale))
        .route("/sales/:sale_id", get(handlers::get_sale))
        .route("/sales/:sale_id/refund", post(handlers::refund_sale))
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_invoices).post(handlers::create_invoice))
        .route("/:invoice_id", get(handlers::get_invoice))
        .route("/:invoice_id/payments", post(handlers::record_invoice_payment))
        .route("/:invoice_id/cancel", post(handlers::cancel_invoice))
}

fn final_sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_final_sales).post(handlers::create_final_sale))
        .route(
            "/:sale_id",
            get(handlers::get_final_sale).delete(handlers::delete_final_sale),
        )
}

fn accounting_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(handlers::list_accounting_entries).post(handlers::create_accounting_entry),
        )
        .route(
            "/entries/:entry_id",
            get(handlers::get_accounting_entry)
                .put(handlers::update_accounting_entry)
                .delete(handlers::delete_accounting_entry),
        )
        .route("/profit-and-loss", get(handlers::get_profit_and_loss))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/sales", get(handlers::get_sales_report))
        .route("/production", get(handlers::get_production_report))
        .route("/low-stock", get(handlers::get_low_stock_report))
        .route("/profit-and-loss", get(handlers::get_profit_and_loss_report))
}
