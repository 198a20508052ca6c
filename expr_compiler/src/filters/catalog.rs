//! Named functions and the filters they create
//!
//! Functions are grouped into categories searched in a fixed order; the
//! last group is a flat table of functions outside any category. Each entry
//! records which of its leading arguments are compiled as variables.

use super::{ExpressionFilter, FilterCore, FilterRegistry};
use crate::config::compile_time::compile::MAX_FUNCTION_ARGUMENTS;
use crate::grammar::{ArgValue, ArgsExpr};
use crate::pipeline::{compile_node, CompileError, ExprPipelineState};

/// How many leading arguments become variable inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many; the rest are kept as text
    Fixed(usize),
    /// Every leading positional expression
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Available,
    /// Known name whose filter is not part of this build
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: &'static str,
    pub setting: Option<&'static str>,
    pub arity: Arity,
    pub support: Support,
}

impl FunctionEntry {
    const fn new(name: &'static str, kind: &'static str, arity: Arity) -> Self {
        Self {
            name,
            aliases: &[],
            kind,
            setting: None,
            arity,
            support: Support::Available,
        }
    }

    const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    const fn setting(self, setting: &'static str) -> Self {
        Self {
            setting: Some(setting),
            ..self
        }
    }

    const fn unsupported(self, reason: &'static str) -> Self {
        Self {
            support: Support::Unsupported(reason),
            ..self
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    /// Primary name followed by aliases
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub entries: &'static [FunctionEntry],
}

use Arity::{All, Fixed};

const fn f(name: &'static str, kind: &'static str, arity: Arity) -> FunctionEntry {
    FunctionEntry::new(name, kind, arity)
}

const fn quality(name: &'static str) -> FunctionEntry {
    FunctionEntry::new(name, "MeshQuality", Fixed(1)).setting(name)
}

const MATH: &[FunctionEntry] = &[
    f("abs", "AbsValue", Fixed(1)),
    f("ceil", "Ceiling", Fixed(1)),
    f("floor", "Floor", Fixed(1)),
    f("round", "Round", Fixed(1)),
    f("exp", "Exp", Fixed(1)),
    f("ln", "NaturalLog", Fixed(1)),
    f("log10", "Base10Log", Fixed(1)),
    f("log10withmin", "Base10LogWithMin", Fixed(2)),
    f("sqrt", "SquareRoot", Fixed(1)),
    f("sq", "Square", Fixed(1)),
    f("sin", "Sin", Fixed(1)),
    f("cos", "Cos", Fixed(1)),
    f("tan", "Tan", Fixed(1)),
    f("asin", "ArcSin", Fixed(1)),
    f("acos", "ArcCos", Fixed(1)),
    f("atan", "ArcTan", Fixed(1)),
    f("atan2", "ArcTan2", Fixed(2)),
    f("sinh", "Sinh", Fixed(1)),
    f("cosh", "Cosh", Fixed(1)),
    f("tanh", "Tanh", Fixed(1)),
    f("deg2rad", "DegreeToRadian", Fixed(1)),
    f("rad2deg", "RadianToDegree", Fixed(1)),
    f("mod", "Modulo", Fixed(2)),
    f("random", "Random", Fixed(1)),
];

const VECTOR_MATRIX: &[FunctionEntry] = &[
    f("cross", "VectorCrossProduct", Fixed(2)),
    f("dot", "VectorDotProduct", Fixed(2)),
    f("magnitude", "Magnitude", Fixed(1)),
    f("normalize", "Normalize", Fixed(1)),
    f("curl", "Curl", Fixed(1)),
    f("divergence", "Divergence", Fixed(1)),
    f("gradient", "Gradient", Fixed(1)),
    f("determinant", "Determinant", Fixed(1)),
    f("inverse", "Inverse", Fixed(1)),
    f("transpose", "Transpose", Fixed(1)),
    f("trace", "Trace", Fixed(1)),
    f("eigenvalue", "Eigenvalue", Fixed(1)),
    f("eigenvector", "Eigenvector", Fixed(1)),
    f("effective_tensor", "EffectiveTensor", Fixed(1)),
    f("tensor_maximum_shear", "TensorMaximumShear", Fixed(1)),
    f("principal_tensor", "PrincipalTensor", Fixed(1)),
    f("principal_deviatoric_tensor", "PrincipalDeviatoricTensor", Fixed(1)),
    f("viscous_stress", "ViscousStress", Fixed(1)),
    f("strain_almansi", "StrainAlmansi", Fixed(2)),
    f("strain_green_lagrange", "StrainGreenLagrange", Fixed(2)),
    f("strain_infinitesimal", "StrainInfinitesimal", Fixed(2)),
    f("strain_rate", "StrainRate", Fixed(2)),
];

const MESH_QUALITY: &[FunctionEntry] = &[
    quality("area"),
    quality("aspect"),
    quality("aspect_gamma"),
    quality("condition"),
    quality("diagonal_ratio"),
    quality("dimension"),
    quality("face_planarity"),
    quality("jacobian"),
    quality("largest_angle"),
    quality("max_edge_length"),
    quality("max_side_volume"),
    quality("min_corner_angle"),
    quality("min_edge_length"),
    quality("min_side_volume"),
    quality("neighbor"),
    quality("node_degree"),
    quality("oddy"),
    quality("relative_face_planarity"),
    quality("relative_size"),
    quality("revolved_surface_area"),
    quality("revolved_volume"),
    quality("scaled_jacobian"),
    quality("shape"),
    quality("shape_and_size"),
    quality("shear"),
    quality("skew"),
    quality("smallest_angle"),
    quality("stretch"),
    quality("taper"),
    quality("volume"),
    quality("volume2"),
    quality("warpage"),
];

const MESH: &[FunctionEntry] = &[
    f("coord", "Coordinates", Fixed(1)).aliases(&["coords"]),
    f("polar", "PolarCoordinates", Fixed(1)),
    f("polar_radius", "PolarCoordinates", Fixed(1)).setting("radius"),
    f("polar_theta", "PolarCoordinates", Fixed(1)).setting("theta"),
    f("polar_phi", "PolarCoordinates", Fixed(1)).setting("phi"),
    f("cylindrical_radius", "CylindricalCoordinates", Fixed(1)).setting("radius"),
    f("cylindrical_theta", "CylindricalCoordinates", Fixed(1)).setting("theta"),
    f("zoneid", "ZoneId", Fixed(1)),
    f("nodeid", "NodeId", Fixed(1)),
    f("global_zoneid", "ZoneId", Fixed(1)).setting("global"),
    f("global_nodeid", "NodeId", Fixed(1)).setting("global"),
    f("zone_type", "ZoneType", Fixed(1)),
    f("external_node", "FindExternal", Fixed(1)).setting("node"),
    f("external_cell", "FindExternal", Fixed(1)).setting("cell"),
    f("surface_normal", "SurfaceNormal", Fixed(1)).aliases(&["point_surface_normal"]),
    f("cell_surface_normal", "SurfaceNormal", Fixed(1)).setting("cell"),
    f("edge_normal", "EdgeNormal", Fixed(1)),
    f("point_edge_normal", "EdgeNormal", Fixed(1)).setting("point"),
];

const MATERIAL: &[FunctionEntry] = &[
    f("matvf", "MatVF", Fixed(1)),
    f("mirvf", "MIRVF", Fixed(3)),
    f("specmf", "SpecMF", Fixed(1)),
    f("nmats", "NMats", Fixed(1)),
    f("materror", "MatError", Fixed(1)),
    f("dominant_mat", "DominantMaterial", Fixed(1)),
    f("value_for_material", "ValueForMaterial", Fixed(1)).aliases(&["val4mat"]),
];

const CONDITIONAL: &[FunctionEntry] = &[
    f("if", "Conditional", Fixed(3)),
    f("and", "LogicalAnd", Fixed(2)),
    f("or", "LogicalOr", Fixed(2)),
    f("not", "LogicalNot", Fixed(1)),
    f("gt", "TestGreaterThan", Fixed(2)),
    f("ge", "TestGreaterThanOrEqual", Fixed(2)),
    f("lt", "TestLessThan", Fixed(2)),
    f("le", "TestLessThanOrEqual", Fixed(2)),
    f("eq", "TestEqual", Fixed(2)),
    f("ne", "TestNotEqual", Fixed(2)),
];

const CMFE: &[FunctionEntry] = &[
    f("conn_cmfe", "ConnCMFE", Fixed(1)),
    f("pos_cmfe", "PosCMFE", Fixed(1)),
    f("curve_cmfe", "CurveCMFE", Fixed(1)),
    f("eval_transform", "EvalTransform", Fixed(1)),
    f("eval_plane", "EvalPlane", Fixed(1)),
    f("eval_point", "EvalPoint", Fixed(1)),
    f("symm_transform", "SymmTransform", Fixed(1)),
    f("symm_plane", "SymmPlane", Fixed(1)),
    f("symm_point", "SymmPoint", Fixed(1)),
];

const IMAGE_PROCESSING: &[FunctionEntry] = &[
    f("mean_filter", "MeanFilter", Fixed(1)),
    f("median_filter", "MedianFilter", Fixed(1)),
    f("conservative_smoothing", "ConservativeSmoothing", Fixed(1)),
    f("abel_inversion", "AbelInversion", Fixed(1)),
];

const TIME_AND_VALUE: &[FunctionEntry] = &[
    f("time", "Time", Fixed(1)),
    f("cycle", "Cycle", Fixed(1)),
    f("timestep", "Timestep", Fixed(1)),
    f("average_over_time", "TimeIterator", Fixed(1)).setting("average"),
    f("min_over_time", "TimeIterator", Fixed(1)).setting("min"),
    f("max_over_time", "TimeIterator", Fixed(1)).setting("max"),
    f("sum_over_time", "TimeIterator", Fixed(1)).setting("sum"),
    f("time_at_minimum", "TimeIterator", Fixed(1)).setting("time_at_min"),
    f("time_at_maximum", "TimeIterator", Fixed(1)).setting("time_at_max"),
    f("cycle_at_minimum", "TimeIterator", Fixed(1)).setting("cycle_at_min"),
    f("cycle_at_maximum", "TimeIterator", Fixed(1)).setting("cycle_at_max"),
    f("value_at_minimum", "TimeIterator", Fixed(2)).setting("value_at_min"),
    f("value_at_maximum", "TimeIterator", Fixed(2)).setting("value_at_max"),
    f("first_time_when_condition_is_true", "TimeIterator", Fixed(1)).setting("first_time"),
    f("last_time_when_condition_is_true", "TimeIterator", Fixed(1)).setting("last_time"),
    f("var_when_condition_is_first_true", "TimeIterator", Fixed(2)).setting("first_var"),
    f("var_when_condition_is_last_true", "TimeIterator", Fixed(2)).setting("last_var"),
];

/// Functions outside any category, searched last
const FLAT: &[FunctionEntry] = &[
    f("enumerate", "ApplyEnumeration", Fixed(1)),
    f("map", "ApplyMap", Fixed(1)),
    f("array_componentwise_division", "ArrayComponentwiseDivision", Fixed(2)),
    f("array_componentwise_product", "ArrayComponentwiseProduct", Fixed(2)),
    f("array_compose", "ArrayCompose", All),
    f("array_compose_with_bins", "ArrayComposeWithBins", All),
    f("array_decompose", "ArrayDecompose", Fixed(1)),
    f("array_decompose2d", "ArrayDecompose2D", Fixed(1)),
    f("array_sum", "ArraySum", Fixed(1)),
    f("localized_compactness", "LocalizedCompactness", Fixed(1)),
    f("recenter", "Recenter", Fixed(1)),
    f("resample", "Resample", Fixed(1)),
    f("displacement", "Displacement", Fixed(1)),
    f("degree", "Degree", Fixed(1)),
    f("cylindrical", "CylindricalCoordinates", Fixed(1)),
    f("procid", "ProcessorId", Fixed(1)),
    f("threadid", "ThreadId", Fixed(1)),
    f("merge_tree", "MergeTree", Fixed(1)).setting("merge"),
    f("split_tree", "MergeTree", Fixed(1)).setting("split"),
    f("local_threshold", "LocalThreshold", Fixed(1)),
    f("crack_width", "CrackWidth", All),
    f("python", "Python", All)
        .aliases(&["py"])
        .unsupported("built without Python filter support"),
    f("mean_curvature", "Curvature", Fixed(1)).setting("mean"),
    f("gauss_curvature", "Curvature", Fixed(1)).setting("gauss"),
    f("ijk_gradient", "Gradient", Fixed(1))
        .aliases(&["ij_gradient"])
        .setting("logical"),
    f("agrad", "Gradient", Fixed(1)).setting("nodal_to_zonal_quad_hex"),
    f("key_aggregate", "KeyAggregator", Fixed(2)).aliases(&["key_agg"]),
    f("laplacian", "Laplacian", Fixed(1)).aliases(&["Laplacian"]),
    f("rectilinear_laplacian", "RectilinearLaplacian", Fixed(1)),
    f("conn_components", "ConnComponents", Fixed(1)),
    f("resrad", "Resrad", Fixed(1)),
    f("relative_difference", "RelativeDifference", Fixed(2)),
    f("var_skew", "VariableSkew", Fixed(2)),
    f("apply_data_binning", "ApplyDataBinning", Fixed(1)).aliases(&["apply_ddf"]),
    f("distance_to_best_fit_line", "DistanceToBestFitLine", Fixed(2)).setting("vertical"),
    f("distance_to_best_fit_line2", "DistanceToBestFitLine", Fixed(2)).setting("perpendicular"),
    f("min", "MinMax", All).aliases(&["minimum"]).setting("min"),
    f("max", "MinMax", All).aliases(&["maximum"]).setting("max"),
    f("geodesic_vector_quantize", "GeodesicVectorQuantize", Fixed(1)),
    f("color", "ColorCompose", Fixed(3)).setting("3"),
    f("color4", "ColorCompose", Fixed(4)).setting("4"),
    f("hsvcolor", "HSVColorCompose", Fixed(3)),
    f("colorlookup", "PerformColorTableLookup", Fixed(1)),
    f("cell_constant", "ConstantFunction", Fixed(1))
        .aliases(&["zonal_constant", "zone_constant"])
        .setting("cell"),
    f("point_constant", "ConstantFunction", Fixed(1))
        .aliases(&["nodal_constant", "node_constant"])
        .setting("point"),
    f("curve_domain", "CurveDomain", Fixed(2)),
    f("curve_integrate", "CurveIntegrate", Fixed(1)),
    f("curve_swapxy", "CurveSwapXY", Fixed(1)),
    f("curve", "Curve", All),
    f("bin", "Bin", Fixed(1)),
    f("isnan", "IsNaN", Fixed(1)),
    f("q_criterion", "QCriterion", Fixed(1)).aliases(&["q_crit"]),
    f("lambda2", "Lambda2", Fixed(1)),
];

/// Categories in lookup order
pub const CATEGORIES: &[Category] = &[
    Category { name: "math", entries: MATH },
    Category { name: "vector/matrix", entries: VECTOR_MATRIX },
    Category { name: "mesh quality", entries: MESH_QUALITY },
    Category { name: "mesh", entries: MESH },
    Category { name: "material", entries: MATERIAL },
    Category { name: "conditional", entries: CONDITIONAL },
    Category { name: "cmfe", entries: CMFE },
    Category { name: "image processing", entries: IMAGE_PROCESSING },
    Category { name: "time and value", entries: TIME_AND_VALUE },
    Category { name: "other", entries: FLAT },
];

/// Filter for a named function call
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    core: FilterCore,
    function: String,
    entry: &'static FunctionEntry,
    variable_count: usize,
    arguments: Vec<String>,
}

impl CatalogFilter {
    /// `function` is the name as written, which may be an alias
    pub fn new(function: &str, entry: &'static FunctionEntry) -> Self {
        let variable_count = match entry.arity {
            Fixed(n) => n,
            All => 0,
        };
        Self {
            core: FilterCore::default(),
            function: function.to_string(),
            entry,
            variable_count,
            arguments: Vec::new(),
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn entry(&self) -> &'static FunctionEntry {
        self.entry
    }
}

impl ExpressionFilter for CatalogFilter {
    fn kind(&self) -> &str {
        self.entry.kind
    }

    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut FilterCore {
        &mut self.core
    }

    fn num_variable_arguments(&self) -> usize {
        self.variable_count
    }

    fn process_arguments(
        &mut self,
        args: Option<&ArgsExpr>,
        state: &mut ExprPipelineState,
        registry: &FilterRegistry,
    ) -> Result<(), CompileError> {
        let Some(args) = args else {
            return Ok(());
        };
        if args.len() > MAX_FUNCTION_ARGUMENTS {
            return Err(CompileError::LimitExceeded {
                limit: "function arguments",
                value: args.len(),
                max: MAX_FUNCTION_ARGUMENTS,
                span: Some(args.span),
            });
        }

        let compiled = match self.entry.arity {
            Fixed(n) => n.min(args.len()),
            All => args.args.iter().take_while(|arg| arg.is_plain_expr()).count(),
        };
        for arg in &args.args[..compiled] {
            match &arg.value {
                ArgValue::Expr(expr) => compile_node(expr, state, registry)?,
                ArgValue::List(_) => {
                    return Err(CompileError::ListAsVariable {
                        function: self.function.clone(),
                        span: arg.span,
                    })
                }
            }
        }

        if self.entry.arity == All {
            self.variable_count = compiled;
        }
        self.arguments = args.args[compiled..]
            .iter()
            .map(|arg| arg.text.clone())
            .collect();
        Ok(())
    }

    fn setting(&self) -> Option<&str> {
        self.entry.setting
    }

    fn extra_arguments(&self) -> &[String] {
        &self.arguments
    }
}
