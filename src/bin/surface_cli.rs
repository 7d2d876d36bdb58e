#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("surface_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use grid_nurbs::geom::{
        IsocurveDirection, IsocurveOptions, MeshDiagnostics, MeshOptions, PointGrid,
        SurfaceBuildOptions, SurfaceHandle, SurfaceMesh, build_surface,
    };
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const USAGE: &str = r#"surface_cli (grid-nurbs)

USAGE:
  surface_cli list
  surface_cli run <scenario|all> [options]

SCENARIOS:
  bump_4x4
  plane
  linear_2x2
  saddle_3x5

OPTIONS (run):
  --deflection <f64>   Mesh deflection (default 0.01)
  --divisions <n>      Isocurve divisions per direction (default 4)
  --points <n>         Samples per isocurve (default 5)
  --out-dir <dir>      Write <scenario>.snap and <scenario>.obj to this dir (required for `all`)
  --obj <path>         Write OBJ (single scenario only)
  --overwrite          Overwrite existing output files
  -h, --help           Show this help
"#;

    #[derive(Debug, Clone, Copy)]
    struct RunSettings {
        deflection: f64,
        divisions: usize,
        points: usize,
    }

    impl Default for RunSettings {
        fn default() -> Self {
            Self {
                deflection: MeshOptions::default().deflection,
                divisions: 4,
                points: 5,
            }
        }
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                for scenario in Scenario::ALL {
                    println!("{}", scenario.name());
                }
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut settings = RunSettings::default();
        let mut out_dir: Option<PathBuf> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--deflection" => settings.deflection = args.parsed("--deflection")?,
                "--divisions" => settings.divisions = args.parsed("--divisions")?,
                "--points" => settings.points = args.parsed("--points")?,
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let scenarios: Vec<Scenario> = if scenario_name == "all" {
            if out_dir.is_none() {
                return Err("`run all` requires --out-dir".to_string());
            }
            Scenario::ALL.to_vec()
        } else {
            vec![Scenario::from_name(&scenario_name).ok_or_else(|| unknown_scenario(&scenario_name))?]
        };

        if let Some(dir) = out_dir.as_ref() {
            if obj_path.is_some() {
                return Err("use either --out-dir or --obj (not both)".to_string());
            }
            fs::create_dir_all(dir).map_err(|e| format!("create out dir: {e}"))?;
        }

        for scenario in scenarios {
            let output = run_scenario(scenario, settings)?;
            if let Some(dir) = out_dir.as_ref() {
                let snap = dir.join(format!("{}.snap", output.name));
                write_text_file(&snap, &output.snapshot, overwrite)?;
                eprintln!("wrote {}", snap.display());
                let obj = dir.join(format!("{}.obj", output.name));
                write_obj_file(&obj, &output.mesh, output.name, overwrite)?;
                eprintln!("wrote {}", obj.display());
            } else {
                print!("{}", output.snapshot);
            }

            if let Some(path) = obj_path.as_deref() {
                write_obj_file(path, &output.mesh, output.name, overwrite)?;
                eprintln!("wrote {}", path.display());
            }

            eprintln!(
                "{}: vertices={} triangles={} | {}",
                output.name,
                output.mesh.vertex_count(),
                output.mesh.triangle_count(),
                output.diagnostics.summary()
            );
        }

        Ok(())
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = format!("unknown scenario `{name}`\n\navailable scenarios:\n");
        for scenario in Scenario::ALL {
            let _ = writeln!(msg, "  {}", scenario.name());
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, mesh: &SurfaceMesh, name: &str, overwrite: bool) -> Result<(), String> {
        mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;

        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# grid-nurbs surface_cli").map_err(|e| format!("write obj: {e}"))?;
        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;
        for p in &mesh.vertices {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(|e| format!("write obj: {e}"))?;
        }
        for [a, b, c] in mesh.triangles.iter().map(|t| t.map(|i| i + 1)) {
            writeln!(w, "f {a} {b} {c}").map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_vec3_line(out: &mut String, prefix: &str, v: [f64; 3]) {
        let [x, y, z] = v.map(quantize_f64);
        let _ = writeln!(
            out,
            "{prefix} {x:.SNAPSHOT_DECIMALS$} {y:.SNAPSHOT_DECIMALS$} {z:.SNAPSHOT_DECIMALS$}"
        );
    }

    fn write_mesh_diagnostics(out: &mut String, diag: &MeshDiagnostics) {
        let _ = writeln!(out, "mesh_diag.vertex_count {}", diag.vertex_count);
        let _ = writeln!(out, "mesh_diag.triangle_count {}", diag.triangle_count);
        let _ = writeln!(out, "mesh_diag.grid {}x{}", diag.grid_u_count, diag.grid_v_count);
        let _ = writeln!(out, "mesh_diag.welded_vertex_count {}", diag.welded_vertex_count);
        let _ = writeln!(
            out,
            "mesh_diag.degenerate_triangle_count {}",
            diag.degenerate_triangle_count
        );
        let _ = writeln!(out, "mesh_diag.boundary_edge_count {}", diag.boundary_edge_count);
        let _ = writeln!(out, "mesh_diag.deflection_reached {}", diag.deflection_reached());
        let _ = writeln!(out, "mesh_diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "mesh_diag.warning.{idx} {warning}");
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        Bump4x4,
        Plane,
        Linear2x2,
        Saddle3x5,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::Bump4x4,
            Scenario::Plane,
            Scenario::Linear2x2,
            Scenario::Saddle3x5,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::Bump4x4 => "bump_4x4",
                Scenario::Plane => "plane",
                Scenario::Linear2x2 => "linear_2x2",
                Scenario::Saddle3x5 => "saddle_3x5",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            Scenario::ALL.iter().copied().find(|s| s.name() == name)
        }

        /// `(rows, cols, flat coordinates)`.
        fn grid(self) -> (usize, usize, Vec<f64>) {
            let sample = |rows: usize, cols: usize, z: fn(usize, usize) -> f64| {
                let coords: Vec<f64> = (0..rows)
                    .flat_map(|r| (0..cols).flat_map(move |c| [c as f64, r as f64, z(r, c)]))
                    .collect();
                (rows, cols, coords)
            };
            match self {
                Scenario::Bump4x4 => sample(4, 4, |r, c| {
                    if (1..=2).contains(&r) && (1..=2).contains(&c) { 1.0 } else { 0.0 }
                }),
                Scenario::Plane => sample(4, 4, |_, _| 0.0),
                Scenario::Linear2x2 => sample(2, 2, |r, c| (r * c) as f64),
                Scenario::Saddle3x5 => sample(3, 5, |r, c| {
                    let x = c as f64 - 2.0;
                    let y = r as f64 - 1.0;
                    0.25 * (x * x - y * y)
                }),
            }
        }
    }

    struct ScenarioOutput {
        name: &'static str,
        mesh: SurfaceMesh,
        diagnostics: MeshDiagnostics,
        snapshot: String,
    }

    fn run_scenario(scenario: Scenario, settings: RunSettings) -> Result<ScenarioOutput, String> {
        let name = scenario.name();
        let (rows, cols, coords) = scenario.grid();
        let grid = PointGrid::from_flat(&coords, rows, cols).map_err(|e| e.to_string())?;
        let surface = build_surface(&grid, &SurfaceBuildOptions::default()).map_err(|e| e.to_string())?;

        let iso_options = IsocurveOptions::new(settings.divisions, settings.points);
        let (mesh, diagnostics) = surface
            .mesh_with_diagnostics(&MeshOptions::new(settings.deflection))
            .map_err(|e| e.to_string())?;

        let mut out = String::new();
        let _ = writeln!(out, "# grid-nurbs snapshot v1");
        let _ = writeln!(out, "scenario {name}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        let _ = writeln!(out, "grid {rows}x{cols}");
        let (degree_u, degree_v) = surface.resolved_degrees();
        let _ = writeln!(out, "degree {degree_u}x{degree_v}");
        let (ku, kv) = surface.knot_vectors();
        let _ = writeln!(out, "knots_u {:?} mults {:?}", ku.knots(), ku.multiplicities());
        let _ = writeln!(out, "knots_v {:?} mults {:?}", kv.knots(), kv.multiplicities());
        for p in surface.control_points() {
            write_vec3_line(&mut out, "cp", p);
        }

        for direction in [IsocurveDirection::U, IsocurveDirection::V] {
            let curves = surface
                .isocurves(direction, &iso_options)
                .map_err(|e| e.to_string())?;
            for (idx, curve) in curves.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "iso.{direction:?}.{idx} param {:.SNAPSHOT_DECIMALS$}",
                    quantize_f64(curve.parameter)
                );
                for p in &curve.points {
                    write_vec3_line(&mut out, "  p", *p);
                }
            }
        }

        write_mesh_diagnostics(&mut out, &diagnostics);
        for v in &mesh.vertices {
            write_vec3_line(&mut out, "v", *v);
        }
        for [a, b, c] in &mesh.triangles {
            let _ = writeln!(out, "t {a} {b} {c}");
        }

        Ok(ScenarioOutput {
            name,
            mesh,
            diagnostics,
            snapshot: out,
        })
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }

        fn parsed<T: std::str::FromStr>(&mut self, flag: &str) -> Result<T, String>
        where
            T::Err: std::fmt::Display,
        {
            let raw = self.value(flag)?;
            raw.parse()
                .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
        }
    }
}
