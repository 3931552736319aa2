//! Fit strategies that need more than the voxel's data.
//!
//! - [`BlockedFit`]: the voxel's output is vector-valued and each call fits
//!   one block of it.
//! - [`IndexedFit`]: the effective model (e.g. acquisition timing) depends on
//!   where the voxel sits, so the solve needs its spatial index.
//!
//! The engine only fixes the contract. How a block is solved, or what an index
//! looks up, is supplied by whoever provides the model, as a closure. Both
//! adapters run the usual entry checks first and verify the shape of whatever
//! the closure returns.

use crate::domain::{ContextKind, FitContext, FitOptions, FitRequest, FitResult, VoxelIndex};
use crate::error::FitError;
use crate::fit::function::{FitFunction, check_result};
use crate::models::{Model, validate_model, validate_request};

pub struct BlockedFit<'m, M, F> {
    model: &'m M,
    options: FitOptions,
    solve: F,
}

impl<'m, M, F> BlockedFit<'m, M, F>
where
    M: Model,
    F: Fn(&M, &FitOptions, &FitRequest, usize) -> Result<FitResult, FitError> + Sync,
{
    pub fn new(model: &'m M, options: FitOptions, solve: F) -> Result<Self, FitError> {
        validate_model(model)?;
        options.validate()?;
        Ok(Self {
            model,
            options,
            solve,
        })
    }
}

impl<M, F> FitFunction for BlockedFit<'_, M, F>
where
    M: Model,
    F: Fn(&M, &FitOptions, &FitRequest, usize) -> Result<FitResult, FitError> + Sync,
{
    type Model = M;

    fn model(&self) -> &M {
        self.model
    }

    fn options(&self) -> &FitOptions {
        &self.options
    }

    fn name(&self) -> &'static str {
        "blocked"
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::Block
    }

    fn fit(&self, request: &FitRequest, context: FitContext) -> Result<FitResult, FitError> {
        let FitContext::Block(block) = context else {
            return Err(FitError::ContextMismatch {
                fitter: self.name(),
                context: context.kind().display_name(),
            });
        };
        validate_request(self.model, request)?;
        let result = (self.solve)(self.model, &self.options, request, block)?;
        check_result(self.model, request, &result)?;
        Ok(result)
    }
}

pub struct IndexedFit<'m, M, F> {
    model: &'m M,
    options: FitOptions,
    solve: F,
}

impl<'m, M, F> IndexedFit<'m, M, F>
where
    M: Model,
    F: Fn(&M, &FitOptions, &FitRequest, VoxelIndex) -> Result<FitResult, FitError> + Sync,
{
    pub fn new(model: &'m M, options: FitOptions, solve: F) -> Result<Self, FitError> {
        validate_model(model)?;
        options.validate()?;
        Ok(Self {
            model,
            options,
            solve,
        })
    }
}

impl<M, F> FitFunction for IndexedFit<'_, M, F>
where
    M: Model,
    F: Fn(&M, &FitOptions, &FitRequest, VoxelIndex) -> Result<FitResult, FitError> + Sync,
{
    type Model = M;

    fn model(&self) -> &M {
        self.model
    }

    fn options(&self) -> &FitOptions {
        &self.options
    }

    fn name(&self) -> &'static str {
        "indexed"
    }

    fn context_kind(&self) -> ContextKind {
        ContextKind::Index
    }

    fn fit(&self, request: &FitRequest, context: FitContext) -> Result<FitResult, FitError> {
        let FitContext::Index(index) = context else {
            return Err(FitError::ContextMismatch {
                fitter: self.name(),
                context: context.kind().display_name(),
            });
        };
        validate_request(self.model, request)?;
        let result = (self.solve)(self.model, &self.options, request, index)?;
        check_result(self.model, request, &result)?;
        Ok(result)
    }
}
