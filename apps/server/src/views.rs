use tera::{Context, Tera};

use crate::error::ApiResult;

/// Turns a named template and its data into HTML.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, context: &Context) -> ApiResult<String>;
}

/// Renders the templates compiled into the binary. HTML templates are
/// autoescaped, so budget names never need escaping by hand.
pub struct TeraViewRenderer {
    tera: Tera,
}

impl TeraViewRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layout.html", include_str!("../templates/layout.html")),
            ("error.html", include_str!("../templates/error.html")),
            (
                "budgets/index.html",
                include_str!("../templates/budgets/index.html"),
            ),
            (
                "budgets/create.html",
                include_str!("../templates/budgets/create.html"),
            ),
            (
                "budgets/edit.html",
                include_str!("../templates/budgets/edit.html"),
            ),
            (
                "budgets/delete.html",
                include_str!("../templates/budgets/delete.html"),
            ),
            (
                "budgets/show.html",
                include_str!("../templates/budgets/show.html"),
            ),
            (
                "budgets/no_budget.html",
                include_str!("../templates/budgets/no_budget.html"),
            ),
            (
                "budgets/income.html",
                include_str!("../templates/budgets/income.html"),
            ),
        ])?;
        Ok(TeraViewRenderer { tera })
    }
}

impl ViewRenderer for TeraViewRenderer {
    fn render(&self, template: &str, context: &Context) -> ApiResult<String> {
        Ok(self.tera.render(template, context)?)
    }
}
