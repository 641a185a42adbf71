use axum::Json;
use serde_json::{json, Value};

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Contacts API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant contacts management service",
            "endpoints": {
                "index": "/api (public)",
                "health": "/api/health (public)",
                "contacts": "/api/contacts[/:id] (protected)",
                "lookup": "/api/contacts/find-by-email?email= (protected)"
            }
        }
    }))
}

/// GET /api - endpoint index
pub async fn api_index() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Contacts API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "GET /api/contacts": "Get all contacts with pagination and filters (query params: page, pageSize, sortBy, sortOrder, firstName, lastName, email, company, tags)",
                "GET /api/contacts/find-by-email": "Look up a contact id by primary email (query param: email)",
                "GET /api/contacts/:id": "Get contact by ID",
                "POST /api/contacts": "Create a new contact",
                "PATCH /api/contacts/:id": "Update contact fields by ID",
                "DELETE /api/contacts/:id": "Delete contact by ID",
                "GET /api/health": "Health check endpoint"
            }
        }
    }))
}
