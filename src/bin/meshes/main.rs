//! Meshes CLI - inspect and edit procedural meshes.
//!
//! Usage: meshes <COMMAND> [OPTIONS] <SHAPE>
//!
//! Run `meshes --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};

use meshes::mesh::{
    build_with, BuildOptions, BuildOutput, Color, Connectivity, GeometryStore, HalfEdgeId,
};
use meshes::ops::collapse_edge;
use meshes::progress::{CancelToken, Progress};
use meshes::shapes::{self, Soup};
use meshes::traverse::{boundary_loops, label_components};

#[derive(Parser)]
#[command(name = "meshes")]
#[command(author, version, about = "Half-edge mesh connectivity CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a primitive and print its connectivity summary
    Info {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Collapse the shortest edges of a primitive
    Collapse {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Number of edges to collapse
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Two-triangle rectangle
    Plane,
    /// Closed box
    Cuboid,
    /// Closed cylinder
    Cylinder,
    /// Latitude/longitude sphere
    UvSphere,
    /// Subdivided icosahedron
    Icosphere,
    /// Flat triangulated grid
    Grid,
}

#[derive(Args, Debug)]
struct ShapeArgs {
    /// Primitive to generate
    #[arg(value_enum)]
    shape: Shape,

    /// Shape resolution (segments, subdivision level or grid size)
    #[arg(short, long)]
    resolution: Option<usize>,

    /// Extent along X (plane, cuboid)
    #[arg(long, default_value = "1.0")]
    width: f64,

    /// Extent along Y (plane, cuboid)
    #[arg(long, default_value = "1.0")]
    length: f64,

    /// Extent along Z (cuboid, cylinder)
    #[arg(long, default_value = "1.0")]
    height: f64,

    /// Radius (cylinder, spheres)
    #[arg(long, default_value = "0.5")]
    radius: f64,

    /// Vertex colour as three components in [0, 1], e.g. `1,0,0`
    #[arg(long, value_delimiter = ',', num_args = 3)]
    color: Option<Vec<f32>>,
}

impl ShapeArgs {
    fn color(&self) -> Option<Color> {
        self.color.as_ref().map(|c| Color::new(c[0], c[1], c[2]))
    }

    fn generate(&self) -> meshes::Result<Soup> {
        let color = self.color();
        let resolution = self.resolution;
        Ok(match self.shape {
            Shape::Plane => shapes::plane(self.width, self.length, color),
            Shape::Cuboid => shapes::cuboid(self.width, self.length, self.height, color),
            Shape::Cylinder => {
                shapes::cylinder(self.radius, self.height, resolution.unwrap_or(16), color)?
            }
            Shape::UvSphere => shapes::uv_sphere(self.radius, resolution.unwrap_or(16), color),
            Shape::Icosphere => shapes::icosphere(self.radius, resolution.unwrap_or(3), color),
            Shape::Grid => {
                let n = resolution.unwrap_or(8);
                let mut soup = shapes::grid(n, n)?;
                if let Some(color) = color {
                    soup.paint(color);
                }
                soup
            }
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { shape } => cmd_info(&shape)?,
        Commands::Collapse { shape, count } => cmd_collapse(&shape, count)?,
    }
    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Never move the bar backwards.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            raw_percent,
            message
        );
        // A failed flush only delays the bar.
        std::io::stderr().flush().ok();

        if current >= total {
            eprintln!();
        }
    })
}

fn load(args: &ShapeArgs) -> Result<(GeometryStore, BuildOutput), Box<dyn std::error::Error>> {
    let soup = args.generate()?;
    let start = Instant::now();
    let output = build_with(
        soup.num_vertices(),
        &soup.faces,
        &BuildOptions::default(),
        &create_progress(),
        &CancelToken::new(),
    )?;
    log::info!("built {:?} in {:.2?}", args.shape, start.elapsed());
    Ok((soup.geometry, output))
}

fn cmd_info(args: &ShapeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (geometry, output) = load(args)?;
    let mesh = &output.connectivity;

    println!("Shape: {:?}", args.shape);
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    let euler = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
    println!("Euler characteristic: {}", euler);

    if let Some((min, max)) = geometry.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    if mesh.is_triangle_mesh() {
        println!("Mesh type: Triangle mesh");
    } else {
        println!("Mesh type: Polygon mesh");
    }
    println!("Manifold: {}", mesh.is_manifold());
    println!("Non-manifold vertices: {}", mesh.non_manifold_vertices().count());

    let loops = boundary_loops(mesh);
    if loops.is_empty() {
        println!("Boundary: closed");
    } else {
        let lengths: Vec<usize> = loops.iter().map(Vec::len).collect();
        println!("Boundary loops: {} (lengths {:?})", loops.len(), lengths);
    }
    println!("Components: {}", label_components(mesh).count);

    for d in &output.diagnostics {
        println!("Diagnostic: {}", d);
    }
    Ok(())
}

fn edge_length(
    mesh: &Connectivity,
    geometry: &GeometryStore,
    h: HalfEdgeId,
) -> meshes::Result<f64> {
    let a = geometry.position(mesh.origin(h)?)?;
    let b = geometry.position(mesh.dest(h)?)?;
    Ok((b - a).norm())
}

fn cmd_collapse(args: &ShapeArgs, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (mut geometry, output) = load(args)?;
    let mut mesh = output.connectivity;
    let progress = create_progress();
    let start = Instant::now();

    let mut collapsed = 0;
    let mut rejected = 0;
    while collapsed < count {
        let mut edges = mesh
            .edges()
            .map(|h| Ok((edge_length(&mesh, &geometry, h)?, h)))
            .collect::<meshes::Result<Vec<_>>>()?;
        edges.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut done = false;
        for (_, h) in edges {
            let a = geometry.position(mesh.origin(h)?)?;
            let b = geometry.position(mesh.dest(h)?)?;
            match collapse_edge(&mut mesh, h) {
                Ok(kept) => {
                    geometry.set_position(kept, meshes::nalgebra::center(&a, &b))?;
                    done = true;
                    break;
                }
                Err(_) => rejected += 1,
            }
        }
        if !done {
            println!("No collapsible edge left");
            break;
        }
        collapsed += 1;
        progress.report(collapsed, count, "Collapsing edges");
    }

    let maps = mesh.compact();
    let geometry = geometry.compact(&maps.vertex_map);

    println!("Collapsed: {} edges in {:.2?}", collapsed, start.elapsed());
    println!("Rejected attempts: {}", rejected);
    println!(
        "Result: {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    );
    println!("Positions after compaction: {}", geometry.len());
    println!("Valid: {}", mesh.is_valid());
    Ok(())
}
