//! Create/edit forms
//!
//! A form holds raw user input. [`Form::validate`] turns it into a draft the
//! matching resource service accepts, or into [`FieldErrors`]; an invalid
//! form never reaches the network. [`submit_create`] and [`submit_update`]
//! run the whole submit flow: validate, send, toast, refresh the list.

pub mod reference;
pub mod subscriber;
pub mod tender;
pub mod validation;

pub use reference::{AuthorityForm, PackageForm, ReferenceForm};
pub use subscriber::{ExpiryExtension, ExtendExpiryForm, SubscriberForm};
pub use tender::{DocumentUpload, TenderForm};
pub use validation::FieldErrors;

use tracing::debug;

use crate::error::Result;
use crate::list::ListController;
use crate::notify::Notifier;
use crate::resource::{Resource, ResourceService};

/// Raw input that validates into a draft.
pub trait Form {
    type Draft;

    fn validate(&self) -> std::result::Result<Self::Draft, FieldErrors>;
}

fn validated<F: Form + ?Sized>(form: &F, notifier: &dyn Notifier) -> Result<F::Draft> {
    form.validate().map_err(|errors| {
        debug!(errors = %errors, "Form rejected");
        notifier.error(errors.first_message().unwrap_or("Please correct the highlighted fields"));
        errors.into()
    })
}

/// Validate and create. On success a toast is shown and `list` refreshed.
pub async fn submit_create<R, F>(
    service: &ResourceService<R>,
    form: &F,
    notifier: &dyn Notifier,
    list: Option<&ListController<R::Entity>>,
) -> Result<R::Entity>
where
    R: Resource,
    F: Form<Draft = R::Draft> + ?Sized,
{
    let draft = validated(form, notifier)?;
    match service.create(&draft).await {
        Ok(entity) => {
            notifier.success(&format!("{} created successfully", R::LABEL));
            if let Some(list) = list {
                // a failed refresh is toasted by the list itself
                let _ = list.refresh().await;
            }
            Ok(entity)
        }
        Err(err) => {
            notifier.report(&err);
            Err(err.into())
        }
    }
}

/// Validate and update record `id`. A record deleted meanwhile refreshes `list`.
pub async fn submit_update<R, F>(
    service: &ResourceService<R>,
    id: &str,
    form: &F,
    notifier: &dyn Notifier,
    list: Option<&ListController<R::Entity>>,
) -> Result<R::Entity>
where
    R: Resource,
    F: Form<Draft = R::Draft> + ?Sized,
{
    let draft = validated(form, notifier)?;
    match service.update(id, &draft).await {
        Ok(entity) => {
            notifier.success(&format!("{} updated successfully", R::LABEL));
            if let Some(list) = list {
                let _ = list.refresh().await;
            }
            Ok(entity)
        }
        Err(err) => {
            notifier.report(&err);
            if err.is_not_found() {
                if let Some(list) = list {
                    let _ = list.refresh().await;
                }
            }
            Err(err.into())
        }
    }
}
