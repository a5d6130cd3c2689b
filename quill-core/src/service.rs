use anyhow::Result;
use async_trait::async_trait;

use crate::context::RequestContext;
use crate::envelope::Envelope;
use crate::errors::QuillError;
use crate::form::FormData;
use crate::pagination::Page;

/// Standard resource methods, similar to Feathers:
/// find, get, create, update, patch, remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl ServiceMethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Update => "update",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
        }
    }
}

/// Capabilities describe which methods a service wants to expose.
///
/// Transports (like quill-axum) mount only the routes listed here.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    /// Full CRUD: `find, get, create, update, patch, remove`.
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: ServiceMethodKind) -> bool {
        self.allowed_methods.contains(&method)
    }
}

fn not_implemented(method: ServiceMethodKind) -> anyhow::Error {
    QuillError::method_not_allowed(format!("Method not implemented: {}", method.as_str()))
        .into_anyhow()
}

/// Core Quill resource contract.
///
/// - `find`   → paginated listing
/// - `get`    → fetch one by id
/// - `create` → create one from submitted form data
/// - `update` → replace one
/// - `patch`  → partial update (defaults to `update`)
/// - `remove` → delete one, responding with `null` data
///
/// Every method answers with an [`Envelope`]. Unimplemented methods
/// fail with `MethodNotAllowed`.
#[async_trait]
pub trait QuillService<R>: Send + Sync
where
    R: Send + 'static,
{
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _ctx: &RequestContext) -> Result<Envelope<Page<R>>> {
        Err(not_implemented(ServiceMethodKind::Find))
    }

    async fn get(&self, _ctx: &RequestContext, _id: &str) -> Result<Envelope<R>> {
        Err(not_implemented(ServiceMethodKind::Get))
    }

    async fn create(&self, _ctx: &RequestContext, _data: FormData) -> Result<Envelope<R>> {
        Err(not_implemented(ServiceMethodKind::Create))
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        _id: &str,
        _data: FormData,
    ) -> Result<Envelope<R>> {
        Err(not_implemented(ServiceMethodKind::Update))
    }

    async fn patch(&self, ctx: &RequestContext, id: &str, data: FormData) -> Result<Envelope<R>> {
        self.update(ctx, id, data).await
    }

    async fn remove(&self, _ctx: &RequestContext, _id: &str) -> Result<Envelope<Option<R>>> {
        Err(not_implemented(ServiceMethodKind::Remove))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::pagination::PageRequest;

    struct ReadOnly;

    #[async_trait]
    impl QuillService<u32> for ReadOnly {
        fn capabilities(&self) -> ServiceCapabilities {
            ServiceCapabilities::from_methods(vec![ServiceMethodKind::Find])
        }

        async fn find(&self, ctx: &RequestContext) -> Result<Envelope<Page<u32>>> {
            let req = PageRequest::from_query(&ctx.query, 5).with_path(ctx.path.clone());
            Ok(Envelope::ok("List", Page::new(vec![1, 2], 2, &req)))
        }
    }

    #[tokio::test]
    async fn unimplemented_methods_are_method_not_allowed() {
        let svc = ReadOnly;
        let ctx = RequestContext::new("/numbers");

        assert!(svc.capabilities().allows(ServiceMethodKind::Find));
        assert!(!svc.capabilities().allows(ServiceMethodKind::Remove));

        let listed = svc.find(&ctx).await.unwrap();
        assert_eq!(listed.data.total, 2);

        let err = svc.patch(&ctx, "1", FormData::new()).await.unwrap_err();
        let quill = QuillError::from_anyhow(&err).unwrap();
        assert_eq!(quill.kind, ErrorKind::MethodNotAllowed);
        assert_eq!(quill.message, "Method not implemented: update");
    }
}
