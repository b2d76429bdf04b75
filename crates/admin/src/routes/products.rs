//! Product catalog management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use afrah_core::{ProductId, Toast, ValidationErrors};
use afrah_store::models::{Product, ProductInput};
use afrah_store::rules::{DocPath, Operation};
use afrah_store::{ProductRepository, RepositoryError};

use crate::error::{AppError, Result};
use crate::flash;
use crate::forms::ProductForm;
use crate::fragments::ProductsFragment;
use crate::layout::Layout;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
}

/// Add and edit share one form.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    /// `None` while adding.
    pub product_id: Option<ProductId>,
    pub form: ProductForm,
    pub errors: ValidationErrors,
}

impl ProductFormTemplate {
    #[must_use]
    pub fn action(&self) -> String {
        self.product_id
            .map_or_else(|| "/products".to_owned(), |id| format!("/products/{id}"))
    }

    #[must_use]
    pub const fn is_edit(&self) -> bool {
        self.product_id.is_some()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit))
        .route("/products/{id}/delete", post(delete))
}

/// `GET /products`
#[instrument(skip_all)]
async fn index(State(state): State<AppState>, layout: Layout) -> Result<ProductsTemplate> {
    Ok(ProductsTemplate {
        products: ProductRepository::new(state.pool()).list().await?,
        layout,
    })
}

/// `GET /products/new`
async fn new(layout: Layout) -> ProductFormTemplate {
    ProductFormTemplate {
        layout,
        product_id: None,
        form: ProductForm::default(),
        errors: ValidationErrors::new(),
    }
}

/// `GET /products/{id}/edit`
#[instrument(skip(state, layout))]
async fn edit(
    State(state): State<AppState>,
    layout: Layout,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    Ok(ProductFormTemplate {
        layout,
        product_id: Some(id),
        form: ProductForm::from_product(&product),
        errors: ValidationErrors::new(),
    })
}

fn resource_data(input: &ProductInput) -> serde_json::Value {
    json!({
        "name": input.name,
        "category": input.category,
        "price": input.price,
        "stock": input.stock,
        "isNew": input.is_new,
    })
}

/// Re-render the form with `errors`.
fn invalid(
    layout: Layout,
    product_id: Option<ProductId>,
    form: ProductForm,
    errors: ValidationErrors,
) -> Response {
    let page = ProductFormTemplate {
        layout,
        product_id,
        form,
        errors,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Turn a slug collision into a field error on the name.
fn name_taken(err: RepositoryError) -> std::result::Result<ValidationErrors, AppError> {
    match err {
        RepositoryError::Conflict(_) => {
            let mut errors = ValidationErrors::new();
            errors.add("name", "A product with this name already exists.");
            Ok(errors)
        }
        other => Err(other.into()),
    }
}

/// `POST /products`
#[instrument(skip(state, session, layout, form), fields(name = %form.name))]
async fn create(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(layout, None, form, errors)),
    };
    state.errors().check(
        &layout.admin.actor(),
        &DocPath::Products,
        Operation::Create,
        Some(resource_data(&input)),
    )?;

    match ProductRepository::new(state.pool()).create(&input).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "product created");
            flash::flash(
                &session,
                Toast::success("Product Created")
                    .with_description(format!("\"{}\" has been created.", product.name)),
            )
            .await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(err) => Ok(invalid(layout, None, form, name_taken(err)?)),
    }
}

/// `POST /products/{id}` - rating, reviews and sales are left alone.
#[instrument(skip(state, session, layout, form), fields(name = %form.name))]
async fn update(
    State(state): State<AppState>,
    session: Session,
    layout: Layout,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(layout, Some(id), form, errors)),
    };
    state.errors().check(
        &layout.admin.actor(),
        &DocPath::Product(id),
        Operation::Update,
        Some(resource_data(&input)),
    )?;

    match ProductRepository::new(state.pool()).update(id, &input).await {
        Ok(product) => {
            flash::flash(
                &session,
                Toast::success("Product Updated")
                    .with_description(format!("\"{}\" has been updated.", product.name)),
            )
            .await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("product {id}"))),
        Err(err) => Ok(invalid(layout, Some(id), form, name_taken(err)?)),
    }
}

/// `POST /products/{id}/delete` (HTMX) - returns the refreshed table.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    state
        .errors()
        .check(&admin.actor(), &DocPath::Product(id), Operation::Delete, None)?;
    products.delete(id).await?;
    tracing::info!(product_id = %id, "product deleted");

    let table = ProductsFragment {
        products: products.list().await?,
    };
    Ok(flash::with_toast(
        table,
        &Toast::success("Product Deleted")
            .with_description(format!("\"{}\" has been deleted.", product.name)),
    ))
}
