fn main() {
    orbit_sandbox::start();
}
