use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use kcal_core::models::{
    DailySummary, DayGroup, MealCategory, MealEntry, TrackerState, today, validate_category,
};
use kcal_core::storage::FileStore;
use kcal_core::store::TrackerStore;

const BODY_LIMIT: usize = 64 * 1024; // 64 KB

#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<TrackerStore<FileStore>>>,
}

fn lock_store(state: &AppState) -> MutexGuard<'_, TrackerStore<FileStore>> {
    state.store.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct SetValueRequest {
    value: String,
}

#[derive(Deserialize)]
struct CreateMealRequest {
    calories: String,
    category: Option<String>,
    date: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

fn validate_iso_date(date: &str) -> Result<(), ApiError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{date}'. Use YYYY-MM-DD")))
}

// --- Handlers ---

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn get_state(State(state): State<AppState>) -> Json<TrackerState> {
    let store = lock_store(&state);
    Json(store.state().clone())
}

async fn get_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailySummary>, ApiError> {
    validate_iso_date(&date)?;
    let store = lock_store(&state);
    Ok(Json(store.daily_summary(&date)))
}

async fn set_target(
    State(state): State<AppState>,
    Json(payload): Json<SetValueRequest>,
) -> Json<serde_json::Value> {
    let mut store = lock_store(&state);
    store.set_target(payload.value);
    Json(serde_json::json!({ "target": store.target().as_str() }))
}

async fn set_burned(
    State(state): State<AppState>,
    Json(payload): Json<SetValueRequest>,
) -> Json<serde_json::Value> {
    let mut store = lock_store(&state);
    store.set_burned(payload.value);
    Json(serde_json::json!({ "burned": store.burned().as_str() }))
}

async fn create_meal(
    State(state): State<AppState>,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<MealEntry>), ApiError> {
    let category = match payload.category.as_deref() {
        Some(c) => validate_category(c).map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => MealCategory::Other,
    };
    let date = match payload.date {
        Some(d) => {
            validate_iso_date(&d)?;
            d
        }
        None => today(),
    };

    let mut store = lock_store(&state);
    match store.add_meal(&payload.calories, category, &date) {
        Some(entry) => Ok((StatusCode::CREATED, Json(entry))),
        None => Err(ApiError::BadRequest(format!(
            "Invalid calorie value '{}'. Use a number greater than 0",
            payload.calories
        ))),
    }
}

async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = lock_store(&state);
    if store.remove_meal(id) {
        Ok(Json(serde_json::json!({ "removed": id })))
    } else {
        Err(ApiError::NotFound(format!("Entry {id} not found")))
    }
}

async fn get_history(State(state): State<AppState>) -> Json<Vec<DayGroup>> {
    let store = lock_store(&state);
    Json(store.history())
}

async fn reset_all(State(state): State<AppState>) -> Json<serde_json::Value> {
    // The widget asks for confirmation before calling this.
    let mut store = lock_store(&state);
    store.reset();
    Json(serde_json::json!({ "reset": true }))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/state", get(get_state))
        .route("/api/summary/{date}", get(get_summary))
        .route("/api/target", put(set_target))
        .route("/api/burned", put(set_burned))
        .route("/api/meals", post(create_meal))
        .route("/api/meals/{id}", delete(delete_meal))
        .route("/api/history", get(get_history))
        .route("/api/reset", post(reset_all))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    store: TrackerStore<FileStore>,
    port: u16,
    bind: &str,
) -> anyhow::Result<()> {
    let state = AppState {
        store: Arc::new(Mutex::new(store)),
    };
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("widget on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Calorie Tracker</title>
  <style>
    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, #111827, #1f2937);
      color: #f9fafb;
      font-family: "Segoe UI", "Helvetica Neue", sans-serif;
      display: flex;
      justify-content: center;
      padding: 24px 12px 48px;
    }

    .app {
      width: min(440px, 100%);
      display: grid;
      gap: 16px;
      align-content: start;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      border-bottom: 1px solid #374151;
      padding-bottom: 12px;
    }

    h1 {
      margin: 0;
      font-size: 1.3rem;
      background: linear-gradient(90deg, #60a5fa, #a78bfa);
      -webkit-background-clip: text;
      background-clip: text;
      color: transparent;
    }

    button {
      border: none;
      border-radius: 8px;
      padding: 8px 14px;
      font-size: 0.9rem;
      font-weight: 600;
      cursor: pointer;
      color: white;
      background: #3b82f6;
    }

    button:active {
      filter: brightness(0.85);
    }

    .btn-danger {
      background: #ef4444;
    }

    .progress-label {
      display: flex;
      justify-content: space-between;
      font-size: 0.85rem;
      color: #d1d5db;
      margin-bottom: 4px;
    }

    .progress-track {
      height: 8px;
      background: #374151;
      border-radius: 999px;
      overflow: hidden;
    }

    .progress-fill {
      height: 100%;
      width: 0;
      background: linear-gradient(90deg, #3b82f6, #a855f7);
      transition: width 400ms ease;
    }

    .stats {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 8px;
    }

    .stat {
      background: rgba(55, 65, 81, 0.5);
      border-radius: 10px;
      padding: 10px 12px;
    }

    .stat .label {
      display: block;
      font-size: 0.75rem;
      color: #9ca3af;
    }

    .stat .value {
      display: block;
      font-size: 1.1rem;
      font-weight: 600;
      color: #34d399;
    }

    .stat .value.negative {
      color: #f87171;
    }

    .tabs {
      display: flex;
      border-bottom: 1px solid #374151;
    }

    .tab {
      flex: 1;
      background: transparent;
      border-radius: 0;
      color: #9ca3af;
      padding: 10px 0;
    }

    .tab.active {
      color: #60a5fa;
      border-bottom: 2px solid #60a5fa;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      font-weight: 600;
      color: #fbbf24;
    }

    input, select {
      width: 100%;
      padding: 9px 10px;
      border-radius: 8px;
      border: 1px solid #4b5563;
      background: #374151;
      color: white;
      font-size: 0.95rem;
      color-scheme: dark;
    }

    .meal-row {
      display: flex;
      gap: 8px;
    }

    .meal-row input {
      flex: 1;
    }

    .meal-row select {
      width: 120px;
    }

    #tracker-pane, #history-pane {
      display: grid;
      gap: 12px;
    }

    h2 {
      margin: 4px 0 0;
      font-size: 1rem;
      color: #f87171;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      display: flex;
      justify-content: space-between;
      align-items: center;
      background: #374151;
      border: 1px solid #4b5563;
      border-radius: 10px;
      padding: 10px 12px;
    }

    li .category {
      color: #9ca3af;
      font-size: 0.8rem;
      margin-left: 6px;
      text-transform: capitalize;
    }

    li button {
      background: #ef4444;
      font-size: 0.75rem;
      padding: 5px 9px;
    }

    .day-card {
      background: rgba(55, 65, 81, 0.5);
      border-radius: 10px;
      padding: 12px;
      display: grid;
      gap: 6px;
    }

    .day-card h3 {
      margin: 0;
      font-size: 0.9rem;
      color: #d1d5db;
    }

    .day-row {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
    }

    .day-row .category {
      color: #9ca3af;
      text-transform: capitalize;
    }

    .day-total {
      border-top: 1px solid #4b5563;
      padding-top: 6px;
      font-size: 0.8rem;
      color: #9ca3af;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.85rem;
      color: #9ca3af;
    }

    .status[data-type="error"] {
      color: #f87171;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Calorie Tracker</h1>
      <button id="reset-btn" class="btn-danger" type="button">Reset</button>
    </header>

    <section>
      <div class="progress-label">
        <span>Progress</span>
        <span id="progress-pct">0.0%</span>
      </div>
      <div class="progress-track">
        <div id="progress-fill" class="progress-fill"></div>
      </div>
    </section>

    <section class="stats">
      <div class="stat">
        <span class="label">Target</span>
        <span id="stat-target" class="value">0 KCAL</span>
      </div>
      <div class="stat">
        <span class="label">Remaining</span>
        <span id="stat-left" class="value">0 KCAL</span>
      </div>
    </section>

    <nav class="tabs">
      <button class="tab active" type="button" data-tab="tracker">Tracker</button>
      <button class="tab" type="button" data-tab="history">History</button>
    </nav>

    <section id="tracker-pane">
      <label>Calories Target
        <input id="target" type="number" placeholder="e.g. 2500" />
      </label>
      <label>Calories Burned
        <input id="burned" type="number" placeholder="e.g. 500" />
      </label>
      <label for="meal">Add Meal</label>
      <div class="meal-row">
        <input id="meal" type="number" placeholder="Calories" />
        <select id="category">
          <option value="breakfast">Breakfast</option>
          <option value="lunch">Lunch</option>
          <option value="dinner">Dinner</option>
          <option value="snack">Snack</option>
          <option value="other" selected>Other</option>
        </select>
        <button id="add-btn" type="button">Add</button>
      </div>
      <label>Date
        <input id="date" type="date" />
      </label>
      <h2>Meals</h2>
      <ul id="meal-list"></ul>
    </section>

    <section id="history-pane" hidden></section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const targetEl = document.getElementById('target');
    const burnedEl = document.getElementById('burned');
    const mealEl = document.getElementById('meal');
    const categoryEl = document.getElementById('category');
    const dateEl = document.getElementById('date');
    const mealListEl = document.getElementById('meal-list');
    const trackerPane = document.getElementById('tracker-pane');
    const historyPane = document.getElementById('history-pane');
    const progressFill = document.getElementById('progress-fill');
    const progressPct = document.getElementById('progress-pct');
    const statTarget = document.getElementById('stat-target');
    const statLeft = document.getElementById('stat-left');
    const statusEl = document.getElementById('status');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    let activeTab = 'tracker';

    dateEl.value = new Date().toISOString().split('T')[0];

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const showError = (err) => setStatus(err.message, 'error');

    const debounce = (fn, ms) => {
      let timer;
      return (...args) => {
        clearTimeout(timer);
        timer = setTimeout(() => fn(...args), ms);
      };
    };

    const renderSummary = (summary) => {
      progressFill.style.width = `${summary.progress_pct}%`;
      progressPct.textContent = `${summary.progress_pct.toFixed(1)}%`;
      statTarget.textContent = `${summary.target || 0} KCAL`;
      statLeft.textContent = `${summary.calories_left} KCAL`;
      statLeft.classList.toggle('negative', summary.calories_left < 0);

      mealListEl.innerHTML = '';
      for (const entry of summary.entries) {
        const li = document.createElement('li');
        const label = document.createElement('span');
        label.textContent = `${entry.calories} KCAL`;
        const category = document.createElement('span');
        category.className = 'category';
        category.textContent = `(${entry.category})`;
        label.appendChild(category);
        const remove = document.createElement('button');
        remove.type = 'button';
        remove.textContent = 'Remove';
        remove.addEventListener('click', () => {
          removeMeal(entry.id).catch(showError);
        });
        li.append(label, remove);
        mealListEl.appendChild(li);
      }
    };

    const renderHistory = (groups) => {
      historyPane.innerHTML = '';
      if (!groups.length) {
        historyPane.textContent = 'Nothing logged yet.';
        return;
      }
      for (const group of groups) {
        const card = document.createElement('div');
        card.className = 'day-card';
        const heading = document.createElement('h3');
        heading.textContent = group.date;
        card.appendChild(heading);
        for (const entry of group.entries) {
          const row = document.createElement('div');
          row.className = 'day-row';
          const cal = document.createElement('span');
          cal.textContent = `${entry.calories} KCAL`;
          const category = document.createElement('span');
          category.className = 'category';
          category.textContent = `(${entry.category})`;
          row.append(cal, category);
          card.appendChild(row);
        }
        const total = document.createElement('div');
        total.className = 'day-total';
        total.textContent = `Total: ${group.total_calories} KCAL`;
        card.appendChild(total);
        historyPane.appendChild(card);
      }
    };

    const refresh = async () => {
      const [stateRes, summaryRes] = await Promise.all([
        fetch('/api/state'),
        fetch(`/api/summary/${dateEl.value}`)
      ]);
      if (!stateRes.ok || !summaryRes.ok) {
        throw new Error('Unable to load tracker state');
      }
      const state = await stateRes.json();
      renderSummary(await summaryRes.json());
      if (document.activeElement !== targetEl) {
        targetEl.value = state.target;
      }
      if (document.activeElement !== burnedEl) {
        burnedEl.value = state.burned;
      }
      if (activeTab === 'history') {
        const res = await fetch('/api/history');
        if (!res.ok) {
          throw new Error('Unable to load history');
        }
        renderHistory(await res.json());
      }
    };

    const putValue = async (path, value) => {
      const res = await fetch(path, {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ value })
      });
      if (!res.ok) {
        throw new Error('Save failed');
      }
    };

    const saveTarget = debounce(() => {
      putValue('/api/target', targetEl.value).then(refresh).catch(showError);
    }, 250);

    const saveBurned = debounce(() => {
      putValue('/api/burned', burnedEl.value).then(refresh).catch(showError);
    }, 250);

    const addMeal = async () => {
      const res = await fetch('/api/meals', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({
          calories: mealEl.value,
          category: categoryEl.value,
          date: dateEl.value
        })
      });
      if (!res.ok) {
        const payload = await res.json().catch(() => null);
        throw new Error(payload ? payload.error : 'Request failed');
      }
      mealEl.value = '';
      setStatus('', '');
      await refresh();
    };

    const removeMeal = async (id) => {
      const res = await fetch(`/api/meals/${id}`, { method: 'DELETE' });
      if (!res.ok) {
        throw new Error('Remove failed');
      }
      await refresh();
    };

    const resetAll = async () => {
      if (!window.confirm('Are you sure you want to reset all data?')) {
        return;
      }
      const res = await fetch('/api/reset', { method: 'POST' });
      if (!res.ok) {
        throw new Error('Reset failed');
      }
      targetEl.value = '';
      burnedEl.value = '';
      mealEl.value = '';
      await refresh();
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => {
        activeTab = button.dataset.tab;
        tabs.forEach((tab) => tab.classList.toggle('active', tab === button));
        trackerPane.hidden = activeTab !== 'tracker';
        historyPane.hidden = activeTab !== 'history';
        refresh().catch(showError);
      });
    });

    targetEl.addEventListener('input', saveTarget);
    burnedEl.addEventListener('input', saveBurned);
    dateEl.addEventListener('change', () => refresh().catch(showError));
    document.getElementById('add-btn').addEventListener('click', () => addMeal().catch(showError));
    document.getElementById('reset-btn').addEventListener('click', () => resetAll().catch(showError));
    mealEl.addEventListener('keydown', (event) => {
      if (event.key === 'Enter') {
        addMeal().catch(showError);
      }
    });

    refresh().catch(showError);
  </script>
</body>
</html>
"##;
