// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Capabilities the runner needs from the surrounding analysis: a
//! measurement method and a model label provider.

use crate::value::MeasurementValue;
use neuroval_structures::{ParameterSet, SamplingMethodology};
use std::marker::PhantomData;

/// Measures a model under one parameter set.
///
/// Methods may ignore `sampling`, but always receive it.
pub trait MeasurementMethod<M: ?Sized> {
    type Error;

    fn measure(
        &self,
        model: &M,
        parameters: &ParameterSet,
        sampling: SamplingMethodology,
    ) -> Result<MeasurementValue, Self::Error>;

    /// Narrative describing how the measurement is made
    fn description(&self) -> String {
        String::new()
    }
}

impl<M: ?Sized, T: MeasurementMethod<M> + ?Sized> MeasurementMethod<M> for &T {
    type Error = T::Error;

    fn measure(
        &self,
        model: &M,
        parameters: &ParameterSet,
        sampling: SamplingMethodology,
    ) -> Result<MeasurementValue, Self::Error> {
        (**self).measure(model, parameters, sampling)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// A closure used as a measurement method, with its narrative
pub struct FnMethod<F, R, E> {
    function: F,
    description: String,
    _result: PhantomData<fn() -> (R, E)>,
}

impl<F, R, E> FnMethod<F, R, E> {
    pub fn new(description: impl Into<String>, function: F) -> Self {
        Self {
            function,
            description: description.into(),
            _result: PhantomData,
        }
    }
}

impl<M, F, R, E> MeasurementMethod<M> for FnMethod<F, R, E>
where
    M: ?Sized,
    F: Fn(&M, &ParameterSet, SamplingMethodology) -> Result<R, E>,
    R: Into<MeasurementValue>,
{
    type Error = E;

    fn measure(
        &self,
        model: &M,
        parameters: &ParameterSet,
        sampling: SamplingMethodology,
    ) -> Result<MeasurementValue, E> {
        (self.function)(model, parameters, sampling).map(Into::into)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Provides the dataset label of a model
pub trait LabelProvider<M: ?Sized> {
    fn get_label(&self, model: &M) -> String;
}

impl<M: ?Sized, F> LabelProvider<M> for F
where
    F: Fn(&M) -> String,
{
    fn get_label(&self, model: &M) -> String {
        self(model)
    }
}

/// The same label for every model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLabel(pub String);

impl<M: ?Sized> LabelProvider<M> for FixedLabel {
    fn get_label(&self, _model: &M) -> String {
        self.0.clone()
    }
}
