//! Handler compilation.
//!
//! [`Handler`] is implemented for async functions and closures of up to
//! twelve [`Param`] arguments returning an [`Output`]. Compiling pairs the
//! function with its validated [`ArgumentPlan`] and erases the argument types
//! behind [`Endpoint`], so routes with different signatures share one
//! descriptor type.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::binding::error::BindError;
use crate::binding::extract::Binder;
use crate::binding::param::{Param, ParamSpec};
use crate::handler::output::{Outcome, Output};
use crate::handler::signature::{ArgumentPlan, Signature};

/// A function usable as a request handler.
///
/// `Args` is the tuple of argument types; it only exists to keep the impls
/// for different arities apart.
pub trait Handler<Args>: Clone + Send + Sync + Sized + 'static {
    type Output: Output;

    /// Parameter facts, in declaration order.
    fn params() -> Vec<ParamSpec>;

    /// Extract every argument from `binder`, then call the function once.
    fn call(self, binder: Binder) -> BoxFuture<'static, Result<Self::Output, BindError>>;

    fn signature() -> Signature {
        Signature {
            params: Self::params(),
            outputs: <Self::Output as Output>::slots(),
        }
    }
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, Fut, O, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = O> + Send + 'static,
            O: Output,
            $($ty: Param,)*
        {
            type Output = O;

            fn params() -> Vec<ParamSpec> {
                vec![$(ParamSpec::of::<$ty>(),)*]
            }

            fn call(self, mut binder: Binder) -> BoxFuture<'static, Result<O, BindError>> {
                Box::pin(async move {
                    $(
                        let $ty = $ty::decode(binder.next_source().await?)?;
                    )*
                    Ok(self($($ty),*).await)
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11, T12);

/// Type-erased compiled handler.
pub trait Endpoint: Send + Sync + 'static {
    /// The plan resolved at registration.
    fn plan(&self) -> &Arc<ArgumentPlan>;

    /// Extract, invoke, and classify the result.
    fn invoke(&self, binder: Binder) -> BoxFuture<'static, Result<Outcome, BindError>>;
}

/// Shared, immutable dispatch unit stored in a route descriptor.
pub type CompiledHandler = Arc<dyn Endpoint>;

struct Compiled<H, Args> {
    handler: H,
    plan: Arc<ArgumentPlan>,
    _args: PhantomData<fn() -> Args>,
}

impl<H, Args> Endpoint for Compiled<H, Args>
where
    H: Handler<Args>,
    Args: 'static,
{
    fn plan(&self) -> &Arc<ArgumentPlan> {
        &self.plan
    }

    fn invoke(&self, binder: Binder) -> BoxFuture<'static, Result<Outcome, BindError>> {
        let call = self.handler.clone().call(binder);
        Box::pin(async move { call.await.map(Output::into_outcome) })
    }
}

/// Bind a handler to its validated plan.
pub fn compile<H, Args>(handler: H, plan: ArgumentPlan) -> CompiledHandler
where
    H: Handler<Args>,
    Args: 'static,
{
    Arc::new(Compiled {
        handler,
        plan: Arc::new(plan),
        _args: PhantomData,
    })
}
