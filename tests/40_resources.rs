mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{spawn_db_app, unique, unique_email, TestApp};

async fn new_client(app: &TestApp) -> Result<i64> {
    let res = app
        .post("/clients", json!({"contact_name": "Ben", "email": unique_email()}))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(res.json::<Value>().await?["client"]["id"].as_i64().unwrap())
}

#[tokio::test]
async fn invoice_with_items_round_trip() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    let client_id = new_client(&app).await?;
    let reference = unique("F");

    let res = app
        .post(
            "/invoices",
            json!({
                "client_id": client_id,
                "reference": reference,
                "subtotal": "300.00",
                "issued_at": "2024-03-01",
                "items": [
                    {"description": "Hosting", "quantity": 2, "unit_price": "100.00"},
                    {"description": "Domain", "unit_price": 100},
                ],
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invoice created");
    let invoice = &body["invoice"];
    assert_eq!(invoice["status"], "draft");
    assert_eq!(invoice["tax_rate"], "7.70");
    assert_eq!(invoice["issued_at"], "2024-03-01");
    assert_eq!(invoice["contact_name"], "Ben");
    assert!(invoice["email"].as_str().is_some_and(|e| e.contains('@')));
    assert_eq!(invoice["items"].as_array().unwrap().len(), 2);
    assert_eq!(invoice["items"][0]["description"], "Hosting");
    assert!(invoice["payments"].as_array().unwrap().is_empty());
    let id = invoice["id"].as_i64().unwrap();

    // Items alone are a valid update and replace the previous lines
    let res = app
        .put(
            "/invoices",
            json!({"id": id, "items": [{"description": "Retainer", "unit_price": "50.00"}]}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invoice updated");
    let items = body["invoice"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["description"], "Retainer");
    assert_eq!(body["invoice"]["subtotal"], "300.00");

    let res = app.get("/invoices?status=draft&limit=500").await?;
    let body: Value = res.json().await?;
    assert!(body["invoices"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["id"] == id));

    let res = app.delete("/invoices", json!({"id": id})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["message"], "Invoice deleted");
    Ok(())
}

#[tokio::test]
async fn invoice_rules() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    let client_id = new_client(&app).await?;
    let reference = unique("F");

    let res = app
        .post("/invoices", json!({"client_id": i64::MAX, "reference": reference}))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["error"], "Client not found");

    let res = app
        .post("/invoices", json!({"client_id": client_id, "reference": reference}))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .post("/invoices", json!({"client_id": client_id, "reference": reference}))
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["details"]["reference"],
        "Reference already exists"
    );

    let res = app
        .post(
            "/invoices",
            json!({"client_id": client_id, "reference": unique("F"), "total": -1}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["details"]["total"],
        "Total must be zero or greater"
    );

    let res = app
        .post("/invoices", json!({"client_id": "seven", "reference": unique("F")}))
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app.delete("/invoices", json!({})).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json::<Value>().await?["error"], "Invoice ID is required");
    Ok(())
}

#[tokio::test]
async fn invoice_amounts_must_fit_their_columns() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    let client_id = new_client(&app).await?;

    let res = app
        .post(
            "/invoices",
            json!({"client_id": client_id, "reference": unique("F"), "tax_rate": 1000}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["details"]["tax_rate"],
        "Tax rate must be less than 1000"
    );

    let res = app
        .post(
            "/invoices",
            json!({
                "client_id": client_id,
                "reference": unique("F"),
                "items": [{"description": "Bulk", "quantity": "100000000000"}],
            }),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["details"]["items[0].quantity"],
        "Quantity must be less than 100000000"
    );

    let res = app
        .post(
            "/invoices",
            json!({"client_id": client_id, "reference": unique("F"), "total": "12.345"}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json::<Value>().await?["details"]["total"],
        "Total must have at most 2 decimal places"
    );
    Ok(())
}

#[tokio::test]
async fn project_lifecycle() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    let client_id = new_client(&app).await?;

    let res = app
        .post("/projects", json!({"client_id": i64::MAX, "name": "Ghost"}))
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .post(
            "/projects",
            json!({"client_id": client_id, "name": "Relaunch", "starts_on": "2024-05-01", "ends_on": "2024-04-01"}),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .post("/projects", json!({"client_id": client_id, "name": "Relaunch"}))
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Project created");
    assert_eq!(body["project"]["status"], "planned");
    assert_eq!(body["project"]["contact_name"], "Ben");
    let id = body["project"]["id"].as_i64().unwrap();

    for title in ["First", "Second"] {
        let res = app.post("/tasks", json!({"project_id": id, "title": title})).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = app.put("/projects", json!({"id": id, "status": "active"})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Project updated");
    assert_eq!(body["project"]["status"], "active");
    let tasks = body["project"]["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Second");

    let body: Value = app
        .get(&format!("/projects?client_id={}", client_id))
        .await?
        .json()
        .await?;
    assert_eq!(body["projects"].as_array().unwrap().len(), 1);

    let res = app.delete("/projects", json!({"id": id})).await?;
    assert_eq!(res.json::<Value>().await?["message"], "Project deleted");
    let body: Value = app
        .get(&format!("/tasks?project_id={}", id))
        .await?
        .json()
        .await?;
    assert!(body["tasks"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn tasks_are_ordered_by_status_priority_and_due_date() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    let client_id = new_client(&app).await?;

    let specs = [
        ("done-high", "done", "high", "2024-01-01"),
        ("todo-low", "todo", "low", "2024-01-01"),
        ("todo-high-late", "todo", "high", "2024-02-01"),
        ("todo-high-early", "todo", "high", "2024-01-15"),
        ("doing-medium", "in_progress", "medium", "2024-03-01"),
    ];
    for (title, status, priority, due) in specs {
        let res = app
            .post(
                "/tasks",
                json!({
                    "client_id": client_id,
                    "title": title,
                    "status": status,
                    "priority": priority,
                    "due_at": due,
                }),
            )
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let body: Value = app
        .get(&format!("/tasks?client_id={}", client_id))
        .await?
        .json()
        .await?;
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        ["doing-medium", "todo-high-early", "todo-high-late", "todo-low", "done-high"]
    );
    assert_eq!(body["tasks"][0]["client_name"], "Ben");

    let body: Value = app
        .get(&format!("/tasks?client_id={}&priority=high&status=todo", client_id))
        .await?
        .json()
        .await?;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn task_references_must_exist() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;

    let res = app
        .post("/tasks", json!({"title": "Orphan", "project_id": i64::MAX, "client_id": i64::MAX}))
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await?;
    assert_eq!(body["details"]["project_id"], "Project not found");
    assert_eq!(body["details"]["client_id"], "Client not found");

    let res = app.post("/tasks", json!({"title": "Standalone"})).await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["task"]["priority"], "medium");
    assert_eq!(body["task"]["status"], "todo");
    assert!(body["task"]["client_name"].is_null());
    let id = body["task"]["id"].as_i64().unwrap();

    let res = app.put("/tasks", json!({"id": id, "status": "done", "due_at": ""})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["task"]["status"], "done");
    assert!(body["task"]["due_at"].is_null());
    Ok(())
}

#[tokio::test]
async fn dashboard_reports_all_figures() -> Result<()> {
    let Some(app) = spawn_db_app().await? else { return Ok(()) };
    app.login_new_user().await?;
    new_client(&app).await?;

    let res = app.get("/dashboard").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    for key in [
        "clients_active",
        "revenue_month",
        "invoices_pending",
        "projects_active",
        "recent_clients",
        "tasks_todo",
    ] {
        assert!(body.get(key).is_some(), "missing {}", key);
    }
    assert!(body["recent_clients"].as_array().unwrap().len() <= 10);
    assert!(body["tasks_todo"].as_array().unwrap().len() <= 10);

    let res = app
        .client
        .post(app.url("/dashboard"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
