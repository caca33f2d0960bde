//! Interpolation registry and helpers.
//!
//! Functions are appended to an ordered table and addressed by a 1-based [`MethodId`].
//! The engine seeds float/vec2/vec3/vec4 linear blends (ids 1..=4) at construction; hosts
//! append their own afterwards. Ids are never reused.

pub mod functions;

use std::fmt;

use crate::error::AutomationError;
use crate::ids::MethodId;
use crate::Result;

use functions::{FloatLinear, VectorLinear};

/// Blends two same-shape values stored as raw bytes.
///
/// `out.len()` is the destination size. Implementations write exactly that many bytes
/// and reject spans they cannot interpret.
pub trait Interpolator: Send + Sync {
    fn name(&self) -> &str;

    fn interpolate(&self, current: &[u8], next: &[u8], progress: f32, out: &mut [u8])
        -> Result<()>;
}

/// Closure-backed interpolator.
struct FnInterpolator<F> {
    name: String,
    f: F,
}

impl<F> Interpolator for FnInterpolator<F>
where
    F: Fn(&[u8], &[u8], f32, &mut [u8]) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn interpolate(
        &self,
        current: &[u8],
        next: &[u8],
        progress: f32,
        out: &mut [u8],
    ) -> Result<()> {
        (self.f)(current, next, progress, out)
    }
}

/// Append-only table of interpolation functions.
#[derive(Default)]
pub struct InterpolationRegistry {
    functions: Vec<Box<dyn Interpolator>>,
}

impl fmt::Debug for InterpolationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.functions.iter().map(|func| func.name()))
            .finish()
    }
}

impl InterpolationRegistry {
    /// Empty registry (no built-ins).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in linear blends.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_functions();
        registry
    }

    fn register_builtin_functions(&mut self) {
        // Fresh registry: these take ids 1..=4 in order.
        self.functions.extend([
            Box::new(FloatLinear) as Box<dyn Interpolator>,
            Box::new(VectorLinear::<2>),
            Box::new(VectorLinear::<3>),
            Box::new(VectorLinear::<4>),
        ]);
        debug_assert_eq!(
            self.method_by_name("vec4Linear"),
            Some(MethodId::VEC4_LINEAR)
        );
    }

    /// Append a function and return its id.
    ///
    /// Ids are never reused; once all `u16::MAX` ids are taken this fails with
    /// `InterpolationRegistryFull` and the function is dropped.
    pub fn register(&mut self, function: Box<dyn Interpolator>) -> Result<MethodId> {
        let raw = u16::try_from(self.functions.len() + 1).map_err(|_| {
            AutomationError::InterpolationRegistryFull {
                capacity: self.functions.len(),
            }
        })?;
        let method =
            MethodId::new(raw).ok_or(AutomationError::InvalidInterpolationMethod { id: raw })?;
        log::debug!("interp: registering '{}' as method {}", function.name(), raw);
        self.functions.push(function);
        Ok(method)
    }

    /// Append a closure under `name`.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> Result<MethodId>
    where
        F: Fn(&[u8], &[u8], f32, &mut [u8]) -> Result<()> + Send + Sync + 'static,
    {
        self.register(Box::new(FnInterpolator {
            name: name.into(),
            f,
        }))
    }

    #[inline]
    pub fn get(&self, method: MethodId) -> Option<&dyn Interpolator> {
        self.functions
            .get(usize::from(method.get()) - 1)
            .map(|f| f.as_ref())
    }

    /// First id registered under `name`.
    pub fn method_by_name(&self, name: &str) -> Option<MethodId> {
        self.functions
            .iter()
            .position(|f| f.name() == name)
            .and_then(|idx| MethodId::new(u16::try_from(idx + 1).ok()?))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Dispatch to the function registered as `method`.
    pub fn invoke(
        &self,
        method: MethodId,
        current: &[u8],
        next: &[u8],
        progress: f32,
        out: &mut [u8],
    ) -> Result<()> {
        let function = self
            .get(method)
            .ok_or(AutomationError::InvalidInterpolationMethod { id: method.get() })?;
        function.interpolate(current, next, progress, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(v: f32) -> [u8; 4] {
        v.to_ne_bytes()
    }

    #[test]
    fn builtins_occupy_first_ids() {
        let reg = InterpolationRegistry::with_builtins();
        assert_eq!(reg.len(), 4);
        assert_eq!(reg.method_by_name("floatLinear"), Some(MethodId::FLOAT_LINEAR));
        assert_eq!(reg.method_by_name("vec3Linear"), Some(MethodId::VEC3_LINEAR));
        assert_eq!(reg.method_by_name("nope"), None);
    }

    #[test]
    fn register_returns_stable_one_based_ids() {
        let mut reg = InterpolationRegistry::with_builtins();
        let id = reg.register_fn("step", |current, _next, _p, out| {
            let n = out.len().min(current.len());
            out[..n].copy_from_slice(&current[..n]);
            Ok(())
        })
        .unwrap();
        assert_eq!(id.get(), 5);
        let id2 = reg.register_fn("other", |_, _, _, _| Ok(())).unwrap();
        assert_eq!(id2.get(), 6);
        assert_eq!(reg.get(id).map(|f| f.name()), Some("step"));
    }

    #[test]
    fn invoke_dispatches_by_id() {
        let reg = InterpolationRegistry::with_builtins();
        let mut out = [0u8; 4];
        reg.invoke(
            MethodId::FLOAT_LINEAR,
            &f32_bytes(0.0),
            &f32_bytes(8.0),
            0.5,
            &mut out,
        )
        .unwrap();
        assert_eq!(f32::from_ne_bytes(out), 4.0);
    }

    #[test]
    fn unregistered_id_is_invalid() {
        let reg = InterpolationRegistry::new();
        let mut out = [0u8; 4];
        let err = reg
            .invoke(
                MethodId::FLOAT_LINEAR,
                &f32_bytes(0.0),
                &f32_bytes(1.0),
                0.5,
                &mut out,
            )
            .unwrap_err();
        assert_eq!(err, AutomationError::InvalidInterpolationMethod { id: 1 });
    }

    #[test]
    fn full_registry_refuses_new_methods() {
        let mut reg = InterpolationRegistry::with_builtins();
        while reg.len() < usize::from(u16::MAX) {
            reg.register_fn("filler", |_, _, _, _| Ok(())).unwrap();
        }
        let last = MethodId::new(u16::MAX).unwrap();
        assert_eq!(reg.get(last).map(|f| f.name()), Some("filler"));

        let err = reg.register_fn("late", |_, _, _, _| Ok(())).unwrap_err();
        assert_eq!(
            err,
            AutomationError::InterpolationRegistryFull {
                capacity: usize::from(u16::MAX)
            }
        );
        assert_eq!(reg.len(), usize::from(u16::MAX));
        assert_eq!(reg.method_by_name("late"), None);
    }
}
