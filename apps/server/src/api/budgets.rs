use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, Redirect},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use budgetbook_core::{
    budgets::{BudgetUpdate, NewBudget},
    constants::JOURNALS_PER_PAGE,
    errors::{Error as CoreError, ValidationError},
    session::{OldInput, SessionContext},
    utils::{
        amount_utils::{is_flag_set, parse_amount, whole_units},
        time_utils::{long_date_label, month_year_label, parse_date},
    },
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::{error::ApiResult, main_lib::AppState, session::Session};

const BUDGETS_URL: &str = "/budgets";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn referrer(headers: &HeaderMap) -> String {
    headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(BUDGETS_URL)
        .to_string()
}

fn redirect_to(bookmark: Option<String>) -> Redirect {
    Redirect::to(bookmark.as_deref().unwrap_or(BUDGETS_URL))
}

/// Renders `template` with the data every budget page shares. Consumes the
/// pending flash message.
fn render_page(
    state: &AppState,
    session: &mut SessionContext,
    template: &str,
    sub_title: Option<String>,
    mut context: Context,
) -> ApiResult<Html<String>> {
    context.insert("title", "Budgets");
    context.insert("main_title_icon", "fa-tasks");
    context.insert("hide_budgets", &true);
    if let Some(sub_title) = sub_title {
        context.insert("sub_title", &sub_title);
    }
    if let Some(flash) = session.take_flash() {
        context.insert("flash", &flash);
    }
    Ok(Html(state.views.render(template, &context)?))
}

#[derive(Debug, Default, Deserialize)]
struct BudgetForm {
    name: Option<String>,
    active: Option<String>,
    create_another: Option<String>,
    return_to_edit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AmountForm {
    amount: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PeriodForm {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<i64>,
}

#[derive(Debug, Serialize)]
struct AmountResponse {
    name: String,
    repetition: i32,
}

async fn index(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
) -> ApiResult<Html<String>> {
    let mut session = session.lock().await;
    let start = session.active_start(today());
    let index = state
        .budget_service
        .get_budget_index(state.user_id, start)
        .await?;

    let mut context = Context::new();
    context.insert("period", &month_year_label(start));
    context.insert("budgets", &index.budgets);
    context.insert("inactive", &index.inactive);
    context.insert("spent", &index.spent);
    context.insert("amount", &index.amount);
    context.insert("overspent", &index.overspent);
    context.insert("spent_pct", &index.spent_pct);
    context.insert("budget_maximum", &index.budget_maximum);
    render_page(&state, &mut session, "budgets/index.html", None, context)
}

async fn create(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let mut session = session.lock().await;
    session.create.form_shown(&referrer(&headers));
    let old_input = session.take_old_input();

    let mut context = Context::new();
    context.insert("old_name", &old_input.name.unwrap_or_default());
    render_page(
        &state,
        &mut session,
        "budgets/create.html",
        Some("Create a new budget".to_string()),
        context,
    )
}

async fn store(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    Form(form): Form<BudgetForm>,
) -> ApiResult<Redirect> {
    let submitted = form.name.unwrap_or_default();
    let budget = state
        .budget_service
        .create_budget(NewBudget {
            user_id: state.user_id,
            name: submitted.clone(),
        })
        .await?;

    let mut session = session.lock().await;
    session.flash_success(format!("New budget \"{}\" stored!", budget.name));

    if is_flag_set(form.create_another.as_deref()) {
        session.create.suppress_next();
        session.keep_input(OldInput {
            name: Some(submitted),
            return_to_edit: false,
        });
        return Ok(Redirect::to("/budgets/create"));
    }
    Ok(redirect_to(session.create.consume()))
}

async fn edit(
    Path(budget_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let budget = state.budget_service.get_budget(state.user_id, budget_id)?;

    let mut session = session.lock().await;
    session.edit.form_shown(&referrer(&headers));
    let old_input = session.take_old_input();

    let mut context = Context::new();
    context.insert("budget", &budget);
    context.insert("return_to_edit", &old_input.return_to_edit);
    let sub_title = format!("Edit budget \"{}\"", budget.name);
    render_page(
        &state,
        &mut session,
        "budgets/edit.html",
        Some(sub_title),
        context,
    )
}

async fn update(
    Path(budget_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    Form(form): Form<BudgetForm>,
) -> ApiResult<Redirect> {
    let budget = state
        .budget_service
        .update_budget(
            state.user_id,
            budget_id,
            BudgetUpdate {
                name: form.name.unwrap_or_default(),
                active: is_flag_set(form.active.as_deref()),
            },
        )
        .await?;

    let mut session = session.lock().await;
    session.flash_success(format!("Budget \"{}\" updated.", budget.name));

    if is_flag_set(form.return_to_edit.as_deref()) {
        session.edit.suppress_next();
        session.keep_input(OldInput {
            name: None,
            return_to_edit: true,
        });
        return Ok(Redirect::to(&format!("/budgets/edit/{}", budget.id)));
    }
    Ok(redirect_to(session.edit.consume()))
}

async fn delete(
    Path(budget_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let budget = state.budget_service.get_budget(state.user_id, budget_id)?;

    let mut session = session.lock().await;
    session.delete.form_shown(&referrer(&headers));

    let mut context = Context::new();
    context.insert("budget", &budget);
    let sub_title = format!("Delete budget \"{}\"", budget.name);
    render_page(
        &state,
        &mut session,
        "budgets/delete.html",
        Some(sub_title),
        context,
    )
}

async fn destroy(
    Path(budget_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
) -> ApiResult<Redirect> {
    let budget = state
        .budget_service
        .delete_budget(state.user_id, budget_id)
        .await?;

    let mut session = session.lock().await;
    session.flash_success(format!("The budget \"{}\" was deleted.", budget.name));
    Ok(redirect_to(session.delete.consume()))
}

async fn render_show(
    state: &AppState,
    session: Session,
    budget_id: i32,
    repetition_id: Option<i32>,
    page: i64,
) -> ApiResult<Html<String>> {
    let page = page.max(1);
    let detail =
        state
            .budget_service
            .get_budget_detail(state.user_id, budget_id, repetition_id, page);

    let mut session = session.0.lock().await;
    let detail = match detail {
        Ok(detail) => detail,
        Err(CoreError::Validation(ValidationError::InvalidSelection(reason))) => {
            tracing::warn!("Rejected budget detail request: {}", reason);
            let mut context = Context::new();
            context.insert("message", "Invalid selection.");
            return render_page(state, &mut session, "error.html", None, context);
        }
        Err(e) => return Err(e.into()),
    };

    let mut context = Context::new();
    context.insert("budget", &detail.budget);
    context.insert("repetition", &detail.repetition);
    context.insert("journals", &detail.journals);
    context.insert("limits", &detail.limits);
    context.insert("page", &page);
    context.insert(
        "has_more",
        &(detail.journals.len() as i64 >= JOURNALS_PER_PAGE),
    );
    render_page(
        state,
        &mut session,
        "budgets/show.html",
        Some(detail.sub_title),
        context,
    )
}

async fn show(
    Path(budget_id): Path<i32>,
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> ApiResult<Html<String>> {
    render_show(&state, session, budget_id, None, query.page.unwrap_or(1)).await
}

async fn show_repetition(
    Path((budget_id, repetition_id)): Path<(i32, i32)>,
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> ApiResult<Html<String>> {
    render_show(
        &state,
        session,
        budget_id,
        Some(repetition_id),
        query.page.unwrap_or(1),
    )
    .await
}

async fn no_budget(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
) -> ApiResult<Html<String>> {
    let mut session = session.lock().await;
    let start = session.active_start(today());
    let end = session.active_end(today());
    let journals = state
        .budget_service
        .get_journals_without_budget(state.user_id, start, end)?;

    let mut context = Context::new();
    context.insert("journals", &journals);
    let sub_title = format!(
        "Transactions without a budget between {} and {}",
        long_date_label(start),
        long_date_label(end)
    );
    render_page(
        &state,
        &mut session,
        "budgets/no_budget.html",
        Some(sub_title),
        context,
    )
}

async fn income(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
) -> ApiResult<Html<String>> {
    let mut session = session.lock().await;
    let start = session.active_start(today());
    let target = state
        .budget_service
        .get_income_target(state.user_id, start)?;

    let mut context = Context::new();
    context.insert("amount", &target.data);
    context.insert("period", &month_year_label(start));
    render_page(&state, &mut session, "budgets/income.html", None, context)
}

async fn update_income(
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    Form(form): Form<AmountForm>,
) -> ApiResult<Redirect> {
    let amount = whole_units(parse_amount(form.amount.as_deref())?)?;
    let start = session.lock().await.active_start(today());
    state
        .budget_service
        .set_income_target(state.user_id, start, amount)
        .await?;
    Ok(Redirect::to(BUDGETS_URL))
}

async fn amount(
    Path(budget_id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Extension(Session(session)): Extension<Session>,
    Form(form): Form<AmountForm>,
) -> ApiResult<Json<AmountResponse>> {
    let amount = parse_amount(form.amount.as_deref())?;
    let start = session.lock().await.active_start(today());
    let update = state
        .budget_service
        .set_limit_amount(state.user_id, budget_id, start, amount)
        .await?;
    Ok(Json(AmountResponse {
        repetition: update.repetition_id(),
        name: update.budget.name,
    }))
}

async fn set_period(
    Extension(Session(session)): Extension<Session>,
    headers: HeaderMap,
    Form(form): Form<PeriodForm>,
) -> ApiResult<Redirect> {
    let start = match form.start.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(raw)?,
        _ => return Err(CoreError::from(ValidationError::MissingField("start".to_string())).into()),
    };
    let end = match form.end.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_date(raw)?),
        _ => None,
    };
    if matches!(end, Some(end) if end < start) {
        return Err(CoreError::from(ValidationError::InvalidInput(
            "the period end lies before its start".to_string(),
        ))
        .into());
    }

    session.lock().await.set_period(start, end);
    Ok(Redirect::to(&referrer(&headers)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(index))
        .route("/budgets/create", get(create))
        .route("/budgets/store", post(store))
        .route("/budgets/edit/{budget}", get(edit))
        .route("/budgets/update/{budget}", post(update))
        .route("/budgets/delete/{budget}", get(delete))
        .route("/budgets/destroy/{budget}", post(destroy))
        .route("/budgets/show/{budget}", get(show))
        .route("/budgets/show/{budget}/{repetition}", get(show_repetition))
        .route("/budgets/list/noBudget", get(no_budget))
        .route("/budgets/income", get(income).post(update_income))
        .route("/budgets/amount/{budget}", post(amount))
        .route("/budgets/period", post(set_period))
}
